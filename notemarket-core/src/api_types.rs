//! Types shared across the HTTP boundary.

use notemarket_model::{Document, display_code};
use serde::{Deserialize, Serialize};

use crate::preview::PreviewState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(error),
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Document plus the derived values a detail page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetails {
    #[serde(flatten)]
    pub document: Document,
    /// `"<ABBR>-<COURSE>"` badge, when both parts are known.
    pub display_code: Option<String>,
    pub size_mb: f64,
}

impl From<Document> for DocumentDetails {
    fn from(document: Document) -> Self {
        let display_code = match (&document.university, &document.course_code) {
            (Some(university), Some(course)) => Some(display_code(university, course)),
            _ => None,
        };
        Self {
            size_mb: document.size_mb(),
            display_code,
            document,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub document: Document,
    pub preview: PreviewState,
    /// Signed link to the PDF the viewer may load.
    pub url: String,
}

/// File returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Outcome of an account deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeletion {
    pub documents_removed: usize,
    pub files_removed: usize,
    pub profile_removed: bool,
}
