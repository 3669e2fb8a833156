//! Persistence ports and their adapters.
//!
//! Services depend only on the traits in [`ports`]. The in-memory adapter
//! backs tests and the `memory` dev backend; the Postgres adapter is compiled
//! with the `database` feature.

pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{InMemoryDocumentRepository, InMemoryProfileRepository};
pub use ports::documents::{DocumentOrder, DocumentRepository};
pub use ports::profiles::ProfileRepository;
#[cfg(feature = "database")]
pub use postgres::{PostgresDatabase, PostgresDocumentRepository, PostgresProfileRepository};
