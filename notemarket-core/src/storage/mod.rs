//! Object storage port for uploaded PDFs and derived previews.

pub mod local;
pub mod memory;
pub mod signing;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{MarketError, Result};

pub use local::LocalObjectStorage;
pub use memory::InMemoryObjectStorage;
pub use signing::{SignatureError, UrlSigner};

/// Expiry used for preview and download links.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload_file(&self, path: &str, bytes: Vec<u8>) -> Result<()>;
    async fn download(&self, path: &str) -> Result<Vec<u8>>;
    async fn exists(&self, path: &str) -> Result<bool>;
    /// Time-limited link to a stored object.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String>;
    /// Missing objects are skipped.
    async fn remove_files(&self, paths: &[String]) -> Result<()>;
}

/// Reject keys that could escape the bucket root.
pub fn validate_key(path: &str) -> Result<()> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(MarketError::Storage(format!("invalid object key: {path:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_stay_inside_the_bucket() {
        assert!(validate_key("owner/file.pdf").is_ok());
        assert!(validate_key("previews/owner/file.pdf").is_ok());
        for bad in ["", "/etc/passwd", "../x.pdf", "a//b.pdf", "a/./b", "a\\b"] {
            assert!(validate_key(bad).is_err(), "{bad} should be rejected");
        }
    }
}
