//! Local validation of upload and edit forms.
//!
//! Everything here runs before storage or the database is touched.

pub mod validation;

pub use validation::{
    DEFAULT_MAX_UPLOAD_BYTES, DocumentForm, InspectedPdf, PriceInput, ValidatedForm,
    ValidationError, inspect_pdf,
};
