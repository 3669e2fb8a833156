use std::{fmt, sync::Arc};

use notemarket_core::MarketplaceService;
use notemarket_core::storage::UrlSigner;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub marketplace: Arc<MarketplaceService>,
    /// Verifies links handed out by the storage adapter.
    pub signer: Arc<UrlSigner>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("marketplace", &self.marketplace)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(marketplace: MarketplaceService, signer: UrlSigner, config: Config) -> Self {
        Self {
            marketplace: Arc::new(marketplace),
            signer: Arc::new(signer),
            config: Arc::new(config),
        }
    }

    pub fn marketplace(&self) -> &MarketplaceService {
        &self.marketplace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
