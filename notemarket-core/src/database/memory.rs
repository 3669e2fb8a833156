use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use notemarket_model::{
    Document, DocumentId, DocumentPatch, NewDocument, Profile, ProfileUpdate, UserId,
};
use parking_lot::RwLock;

use super::ports::documents::{DocumentOrder, DocumentRepository};
use super::ports::profiles::ProfileRepository;
use crate::error::{MarketError, Result};

/// Document rows kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    rows: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows verbatim, e.g. fixtures with fixed timestamps.
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let rows = documents.into_iter().map(|d| (d.id, d)).collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

fn sorted(mut docs: Vec<Document>, order: DocumentOrder) -> Vec<Document> {
    // Id as tiebreaker keeps equal timestamps deterministic.
    match order {
        DocumentOrder::NewestFirst => {
            docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)))
        }
        DocumentOrder::OldestFirst => {
            docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
        }
    }
    docs
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn list_documents(
        &self,
        order: DocumentOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let docs: Vec<Document> = self.rows.read().values().cloned().collect();
        let mut docs = sorted(docs, order);
        if let Some(limit) = limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Document>> {
        let docs = self
            .rows
            .read()
            .values()
            .filter(|d| d.owner_id == owner)
            .cloned()
            .collect();
        Ok(sorted(docs, DocumentOrder::NewestFirst))
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn insert_document(&self, new: NewDocument) -> Result<Document> {
        let doc = Document::from_new(DocumentId::new(), new, Utc::now());
        self.rows.write().insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn update_document(&self, id: DocumentId, patch: &DocumentPatch) -> Result<Document> {
        let mut rows = self.rows.write();
        let doc = rows
            .get_mut(&id)
            .ok_or_else(|| MarketError::NotFound(format!("document {id}")))?;
        patch.apply(doc, Utc::now());
        Ok(doc.clone())
    }

    async fn delete_document(&self, id: DocumentId) -> Result<Option<Document>> {
        Ok(self.rows.write().remove(&id))
    }

    async fn delete_by_owner(&self, owner: UserId) -> Result<Vec<Document>> {
        let mut rows = self.rows.write();
        let ids: Vec<DocumentId> = rows
            .values()
            .filter(|d| d.owner_id == owner)
            .map(|d| d.id)
            .collect();
        Ok(ids.into_iter().filter_map(|id| rows.remove(&id)).collect())
    }

    async fn increment_view_count(&self, id: DocumentId) -> Result<()> {
        let mut rows = self.rows.write();
        let doc = rows
            .get_mut(&id)
            .ok_or_else(|| MarketError::NotFound(format!("document {id}")))?;
        doc.view_count += 1;
        Ok(())
    }

    async fn set_page_count(&self, id: DocumentId, pages: u32) -> Result<()> {
        let mut rows = self.rows.write();
        let doc = rows
            .get_mut(&id)
            .ok_or_else(|| MarketError::NotFound(format!("document {id}")))?;
        doc.page_count.get_or_insert(pages.max(1));
        Ok(())
    }
}

/// Profiles kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: DashMap<UserId, Profile>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>> {
        Ok(self.profiles.get(&id).map(|p| p.value().clone()))
    }

    async fn create_profile(&self, profile: &Profile) -> Result<()> {
        use dashmap::mapref::entry::Entry;
        match self.profiles.entry(profile.id) {
            Entry::Occupied(_) => Err(MarketError::Conflict(format!(
                "profile {} already exists",
                profile.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(profile.clone());
                Ok(())
            }
        }
    }

    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<Profile> {
        let mut profile = self
            .profiles
            .get_mut(&id)
            .ok_or_else(|| MarketError::NotFound(format!("profile {id}")))?;
        update.apply(&mut profile, Utc::now());
        Ok(profile.value().clone())
    }

    async fn delete_profile(&self, id: UserId) -> Result<bool> {
        Ok(self.profiles.remove(&id).is_some())
    }
}
