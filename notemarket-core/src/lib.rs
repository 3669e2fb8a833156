//! # NoteMarket Core
//!
//! Core library for the NoteMarket student document marketplace.
//!
//! - [`catalog`]: the catalog view-model. Facets, filtering and sorting,
//!   active-filter chips, statistics and the reducer-driven [`CatalogState`].
//! - [`preview`]: the preview gate deciding which PDF pages a viewer may see.
//! - [`upload`]: local validation of sell and edit forms.
//! - [`pdf`]: page counting and truncated preview copies.
//! - [`database`], [`storage`], [`identity`]: gateway ports and adapters.
//! - [`application`]: the [`MarketplaceService`] orchestrating the ports.
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL repositories via sqlx (enabled by default).
#![allow(missing_docs)]

pub mod api_types;
pub mod application;
pub mod catalog;
pub mod database;
pub mod error;
pub mod identity;
pub mod pdf;
pub mod preview;
pub mod storage;
pub mod upload;

pub use application::{MarketplaceService, ServiceSettings};
pub use catalog::{CatalogState, CatalogView, FilterSelection};
pub use error::{MarketError, Result};
pub use identity::{Identity, IdentityProvider};

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
