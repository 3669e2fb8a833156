use async_trait::async_trait;
use notemarket_model::{Document, DocumentId, DocumentPatch, NewDocument, UserId};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordering applied by the repository, always on `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn list_documents(
        &self,
        order: DocumentOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Document>>;
    /// Newest first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Document>>;
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>>;
    async fn insert_document(&self, new: NewDocument) -> Result<Document>;
    async fn update_document(&self, id: DocumentId, patch: &DocumentPatch) -> Result<Document>;
    /// Returns the removed row, `None` when nothing matched.
    async fn delete_document(&self, id: DocumentId) -> Result<Option<Document>>;
    async fn delete_by_owner(&self, owner: UserId) -> Result<Vec<Document>>;
    async fn increment_view_count(&self, id: DocumentId) -> Result<()>;
    /// Record a page count counted after the fact. Rows that already have
    /// one are left alone.
    async fn set_page_count(&self, id: DocumentId, pages: u32) -> Result<()>;
}
