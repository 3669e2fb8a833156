//! Wiring of adapters into an [`AppState`].

use std::sync::Arc;

use anyhow::Context;
use notemarket_core::MarketplaceService;
use notemarket_core::database::{
    DocumentRepository, InMemoryDocumentRepository, InMemoryProfileRepository,
    PostgresDatabase, ProfileRepository,
};
use notemarket_core::identity::JwtIdentityProvider;
use notemarket_core::storage::{
    InMemoryObjectStorage, LocalObjectStorage, ObjectStorage, UrlSigner,
};
use tracing::{info, warn};

use crate::infra::app_state::AppState;
use crate::infra::config::{Backend, Config};

/// Connect to PostgreSQL and bring the schema up to date.
pub async fn connect_database(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let url = config
        .database
        .url
        .as_deref()
        .context("no database URL configured")?;
    let db = PostgresDatabase::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    db.migrate().await.context("failed to run migrations")?;
    Ok(db)
}

pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let signer = UrlSigner::new(&config.storage.signing_key, &config.storage.public_base_url)
        .context("invalid URL signing configuration")?;

    let storage: Arc<dyn ObjectStorage> = match &config.storage.root {
        Some(root) => {
            let local = LocalObjectStorage::new(root.clone(), signer.clone())
                .await
                .with_context(|| format!("failed to prepare storage root {}", root.display()))?;
            info!(root = %root.display(), "using local object storage");
            Arc::new(local)
        }
        None => {
            if config.backend == Backend::Postgres {
                warn!("no storage root configured; uploaded files are kept in memory only");
            }
            Arc::new(InMemoryObjectStorage::new(signer.clone()))
        }
    };

    let (documents, profiles): (Arc<dyn DocumentRepository>, Arc<dyn ProfileRepository>) =
        match config.backend {
            Backend::Memory => {
                warn!("using the in-memory backend; documents are lost on restart");
                (
                    Arc::new(InMemoryDocumentRepository::new()),
                    Arc::new(InMemoryProfileRepository::new()),
                )
            }
            Backend::Postgres => {
                let db = connect_database(&config).await?;
                (Arc::new(db.documents()), Arc::new(db.profiles()))
            }
        };

    let identity = JwtIdentityProvider::new(&config.auth.jwt_secret)
        .context("invalid JWT configuration")?;

    let marketplace = MarketplaceService::new(
        documents,
        profiles,
        storage,
        Arc::new(identity),
        config.service_settings(),
    );
    Ok(AppState::new(marketplace, signer, config))
}
