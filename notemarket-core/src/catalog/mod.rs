//! Catalog view-model.
//!
//! Pure derivations from the loaded document list: facet extraction, filter
//! and sort, active-filter chips, statistics, and the reducer-driven
//! [`CatalogState`] that ties them together.

pub mod facets;
pub mod filtering;
pub mod sorting;
pub mod state;
pub mod stats;

pub use facets::{Facets, extract_facets};
pub use filtering::{FilterSelection, apply_selection, filter_documents};
pub use sorting::{compare_documents, sort_documents, sorted_documents};
pub use state::{ActiveFilter, CatalogAction, CatalogState, CatalogView, LoadStatus};
pub use stats::{CatalogStatistics, LabelCount, ViewedDocument};
