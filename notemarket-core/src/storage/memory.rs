use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::signing::UrlSigner;
use super::{ObjectStorage, validate_key};
use crate::error::{MarketError, Result};

/// Objects kept in process memory; signed links use the same format as
/// [`super::LocalObjectStorage`].
#[derive(Debug)]
pub struct InMemoryObjectStorage {
    objects: DashMap<String, Vec<u8>>,
    signer: UrlSigner,
}

impl InMemoryObjectStorage {
    pub fn new(signer: UrlSigner) -> Self {
        Self {
            objects: DashMap::new(),
            signer,
        }
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload_file(&self, path: &str, bytes: Vec<u8>) -> Result<()> {
        validate_key(path)?;
        self.objects.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .get(path)
            .map(|e| e.value().clone())
            .ok_or_else(|| MarketError::NotFound(format!("object {path}")))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.objects.contains_key(path))
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String> {
        validate_key(path)?;
        Ok(self.signer.sign(path, ttl, Utc::now()))
    }

    async fn remove_files(&self, paths: &[String]) -> Result<()> {
        for path in paths {
            self.objects.remove(path);
        }
        Ok(())
    }
}
