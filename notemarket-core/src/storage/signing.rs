//! HMAC-SHA-256 signed links for private objects.
//!
//! A link is `<base>/files/<key>?expires=<unix>&signature=<hex>`, where the
//! signature covers the key and the expiry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use url::Url;

use crate::error::{MarketError, Result};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("link expired")]
    Expired,
    #[error("signature mismatch")]
    Mismatch,
    #[error("malformed signature")]
    Malformed,
}

#[derive(Debug, Clone)]
pub struct UrlSigner {
    key: Vec<u8>,
    base_url: Url,
}

impl UrlSigner {
    /// `base_url` is the public prefix the `/files` route is mounted under.
    pub fn new(key: impl AsRef<[u8]>, base_url: &str) -> Result<Self> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(MarketError::Internal("URL signing key must not be empty".into()));
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| MarketError::Internal(format!("invalid public base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketError::Internal(format!(
                "public base URL {base_url} cannot be a base"
            )));
        }
        Ok(Self {
            key: key.to_vec(),
            base_url,
        })
    }

    fn mac(&self, path: &str, expires: i64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC-SHA-256 accepts keys of any size");
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    pub fn signature(&self, path: &str, expires: i64) -> String {
        hex::encode(self.mac(path, expires).finalize().into_bytes())
    }

    pub fn sign(&self, path: &str, ttl: Duration, now: DateTime<Utc>) -> String {
        let expires = now.timestamp() + i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2);
        let signature = self.signature(path, expires);

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("files").extend(path.split('/'));
        }
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);
        url.to_string()
    }

    pub fn verify(
        &self,
        path: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SignatureError> {
        let provided = hex::decode(signature).map_err(|_| SignatureError::Malformed)?;
        let expected = self.mac(path, expires).finalize().into_bytes();
        if !constant_time_eq(&provided, &expected) {
            return Err(SignatureError::Mismatch);
        }
        if now.timestamp() > expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}
