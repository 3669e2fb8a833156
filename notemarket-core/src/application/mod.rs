//! Application services composed from the repository, storage and identity
//! ports.

pub mod marketplace;

pub use marketplace::{MarketplaceService, ServiceSettings};
