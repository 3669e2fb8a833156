//! Core data model definitions shared across NoteMarket crates.
#![allow(missing_docs)]

pub mod document;
pub mod error;
pub mod files;
pub mod filter_types;
pub mod ids;
pub mod profile;
pub mod universities;

// Intentionally curated re-exports for downstream consumers.
pub use document::{
    Document, DocumentPatch, FileReplacement, Grade, NewDocument, Season,
    Semester, normalize_course_code,
};
pub use error::{ModelError, Result as ModelResult};
pub use files::{
    PDF_CONTENT_TYPE, document_filename, preview_path_for, sanitize_filename,
    storage_path_for,
};
pub use filter_types::{Bounds, SortKey};
pub use ids::{DocumentId, UserId};
pub use profile::{Profile, ProfileUpdate};
pub use universities::{UNIVERSITIES, University, abbreviation_for, display_code};
