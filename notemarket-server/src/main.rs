//! NoteMarket server binary.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use notemarket_core::{Identity, identity::JwtIdentityProvider};
use notemarket_model::UserId;
use notemarket_server::{
    build_router,
    infra::{
        config::{Backend, Config, ConfigOverrides},
        startup::{build_state, connect_database},
    },
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "notemarket-server")]
#[command(about = "HTTP API for the NoteMarket study-document marketplace")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(long, env = "NOTEMARKET_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Storage backend for documents and profiles
    #[arg(long, env = "NOTEMARKET_BACKEND", value_enum)]
    backend: Option<Backend>,

    /// PostgreSQL connection string (postgres backend)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Directory for uploaded files; omitted keeps them in memory
    #[arg(long, env = "NOTEMARKET_STORAGE_ROOT")]
    storage_root: Option<PathBuf>,

    /// Public prefix signed file links are built on, e.g. https://host/api/v1
    #[arg(long, env = "NOTEMARKET_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// HMAC key for signed file links
    #[arg(long, env = "NOTEMARKET_SIGNING_KEY", hide_env_values = true)]
    signing_key: Option<String>,

    /// Shared secret of the identity provider's HS256 tokens
    #[arg(long, env = "NOTEMARKET_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, env = "NOTEMARKET_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Lifetime of signed file links in seconds
    #[arg(long, env = "NOTEMARKET_SIGNED_URL_TTL")]
    signed_url_ttl: Option<u64>,

    /// Largest accepted PDF in bytes
    #[arg(long, env = "NOTEMARKET_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<u64>,
}

impl From<ServeArgs> for ConfigOverrides {
    fn from(args: ServeArgs) -> Self {
        Self {
            config_path: args.config,
            host: args.host,
            port: args.port,
            backend: args.backend,
            database_url: args.database_url,
            storage_root: args.storage_root,
            public_base_url: args.public_base_url,
            signing_key: args.signing_key,
            jwt_secret: args.jwt_secret,
            cors_origins: args.cors_origins,
            signed_url_ttl_secs: args.signed_url_ttl,
            max_upload_bytes: args.max_upload_bytes,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    /// Mint a bearer token with the configured secret for local testing
    DevToken {
        /// User id; a random one is used when omitted
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Token lifetime in hours
        #[arg(long, default_value_t = 24)]
        hours: u64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notemarket=debug,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = env_file {
        info!(path = %path.display(), "loaded .env file");
    }

    let config = Config::load(cli.serve.into())?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => {
            connect_database(&config).await?;
            info!("Database migrations applied");
            Ok(())
        }
        Some(Command::DevToken {
            user,
            email,
            username,
            hours,
        }) => {
            let provider = JwtIdentityProvider::new(&config.auth.jwt_secret)?;
            let identity = Identity {
                user_id: user.map(UserId).unwrap_or_default(),
                email,
                username,
            };
            let token = provider.issue(&identity, Duration::from_secs(hours * 3600))?;
            println!("{token}");
            Ok(())
        }
        None => run_server(config).await,
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    info!(backend = ?config.backend, "Starting NoteMarket server");

    let state = build_state(config).await?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
