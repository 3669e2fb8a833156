//! Server configuration.
//!
//! Values resolve in order: command line / environment, then the TOML file
//! (`NOTEMARKET_CONFIG`, else `notemarket.toml` when present), then defaults.

pub mod sources;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use notemarket_core::ServiceSettings;
use notemarket_core::storage::SIGNED_URL_TTL;
use notemarket_core::upload::DEFAULT_MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

pub use sources::FileConfig;

pub const DEFAULT_CONFIG_FILE: &str = "notemarket.toml";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Where documents and profiles live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Process memory; everything is lost on restart.
    #[default]
    Memory,
    Postgres,
}

/// Command-line and environment values. Unset fields fall through to the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub backend: Option<Backend>,
    pub database_url: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub public_base_url: Option<String>,
    pub signing_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub cors_origins: Vec<String>,
    pub signed_url_ttl_secs: Option<u64>,
    pub max_upload_bytes: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone)]
pub struct StorageConfig {
    /// Local directory for objects; `None` keeps them in memory.
    pub root: Option<PathBuf>,
    /// Prefix signed links are built on, normally `<origin>/api/v1`.
    pub public_base_url: String,
    pub signing_key: String,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("root", &self.root)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct LimitsConfig {
    pub signed_url_ttl: Duration,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: Backend,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Read the config file, if any, and merge `overrides` on top.
    pub fn load(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let path = overrides.config_path.clone().or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.to_path_buf())
        });
        let file = match &path {
            Some(path) => {
                info!(path = %path.display(), "loading configuration file");
                FileConfig::read(path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, overrides)
    }

    pub fn resolve(file: FileConfig, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let host = overrides
            .host
            .or(file.server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = overrides.port.or(file.server.port).unwrap_or(DEFAULT_PORT);
        let backend = overrides.backend.or(file.backend).unwrap_or_default();

        let database_url = overrides.database_url.or(file.database.url);
        if backend == Backend::Postgres && database_url.is_none() {
            bail!("the postgres backend needs a database URL (set DATABASE_URL)");
        }

        let jwt_secret = overrides
            .jwt_secret
            .or(file.auth.jwt_secret)
            .filter(|s| !s.is_empty())
            .context("a JWT secret is required (set NOTEMARKET_JWT_SECRET)")?;

        let signing_key = match overrides
            .signing_key
            .or(file.storage.signing_key)
            .filter(|s| !s.is_empty())
        {
            Some(key) => key,
            None => {
                warn!("no URL signing key configured; signed links will not survive a restart");
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };

        let public_base_url = match overrides.public_base_url.or(file.storage.public_base_url) {
            Some(url) => url,
            None => {
                let visible_host = if host == "0.0.0.0" { "localhost" } else { host.as_str() };
                format!("http://{visible_host}:{port}/api/v1")
            }
        };
        Url::parse(&public_base_url)
            .with_context(|| format!("invalid public base URL {public_base_url}"))?;

        let ttl_secs = overrides
            .signed_url_ttl_secs
            .or(file.limits.signed_url_ttl_secs)
            .unwrap_or(SIGNED_URL_TTL.as_secs());
        if ttl_secs == 0 {
            bail!("signed URL lifetime must be at least one second");
        }

        let cors_origins = if overrides.cors_origins.is_empty() {
            file.cors.allowed_origins
        } else {
            overrides.cors_origins
        };

        Ok(Self {
            server: ServerConfig { host, port },
            backend,
            database: DatabaseConfig {
                url: database_url,
                max_connections: file
                    .database
                    .max_connections
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            storage: StorageConfig {
                root: overrides.storage_root.or(file.storage.root),
                public_base_url,
                signing_key,
            },
            auth: AuthConfig { jwt_secret },
            cors: CorsConfig {
                allowed_origins: cors_origins,
            },
            limits: LimitsConfig {
                signed_url_ttl: Duration::from_secs(ttl_secs),
                max_upload_bytes: overrides
                    .max_upload_bytes
                    .or(file.limits.max_upload_bytes)
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
        })
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            signed_url_ttl: self.limits.signed_url_ttl,
            max_upload_bytes: self.limits.max_upload_bytes,
        }
    }

    /// Request body cap: the base64 payload plus room for the form fields.
    pub fn body_limit(&self) -> usize {
        let encoded = self.limits.max_upload_bytes.saturating_mul(4) / 3 + 64 * 1024;
        usize::try_from(encoded).unwrap_or(usize::MAX)
    }
}
