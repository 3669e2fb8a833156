use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use notemarket_model::{
    Document, DocumentId, FileReplacement, Profile, ProfileUpdate, UserId, document_filename,
    preview_path_for, storage_path_for,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::api_types::{AccountDeletion, DownloadedFile, PreviewResponse};
use crate::catalog::{CatalogAction, CatalogState, CatalogStatistics, CatalogView, FilterSelection};
use crate::database::{DocumentOrder, DocumentRepository, ProfileRepository};
use crate::error::{MarketError, Result};
use crate::identity::{Identity, IdentityProvider};
use crate::pdf;
use crate::preview::PreviewGate;
use crate::storage::{ObjectStorage, SIGNED_URL_TTL};
use crate::upload::{DEFAULT_MAX_UPLOAD_BYTES, DocumentForm, inspect_pdf};

#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub signed_url_ttl: Duration,
    pub max_upload_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            signed_url_ttl: SIGNED_URL_TTL,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Orchestrates repositories, object storage and identity for every
/// marketplace operation. Each call performs its backend requests once;
/// failures are returned, never retried.
#[derive(Clone)]
pub struct MarketplaceService {
    documents: Arc<dyn DocumentRepository>,
    profiles: Arc<dyn ProfileRepository>,
    storage: Arc<dyn ObjectStorage>,
    identity: Arc<dyn IdentityProvider>,
    settings: ServiceSettings,
}

impl std::fmt::Debug for MarketplaceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MarketplaceService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        profiles: Arc<dyn ProfileRepository>,
        storage: Arc<dyn ObjectStorage>,
        identity: Arc<dyn IdentityProvider>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            documents,
            profiles,
            storage,
            identity,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    // ===== Catalog =====

    pub async fn list_catalog(&self, selection: FilterSelection) -> Result<CatalogView> {
        let documents = self
            .documents
            .list_documents(DocumentOrder::NewestFirst, None)
            .await?;
        let state = CatalogState::new(documents).reduce(CatalogAction::Select(selection));
        Ok(state.view())
    }

    pub async fn get_document(&self, id: DocumentId) -> Result<Document> {
        self.documents
            .get_document(id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("document {id}")))
    }

    pub async fn my_documents(&self, owner: &Identity) -> Result<Vec<Document>> {
        self.documents.list_by_owner(owner.user_id).await
    }

    pub async fn statistics(&self, now: DateTime<Utc>) -> Result<CatalogStatistics> {
        let documents = self
            .documents
            .list_documents(DocumentOrder::NewestFirst, None)
            .await?;
        Ok(CatalogStatistics::compute(&documents, now))
    }

    // ===== Preview =====

    /// Gate state for `page` and a signed link to what the viewer may load:
    /// the original for owners, a truncated copy for everyone else.
    #[instrument(skip(self, viewer), fields(viewer = ?viewer.map(|v| v.user_id)))]
    pub async fn preview(
        &self,
        id: DocumentId,
        viewer: Option<&Identity>,
        page: u32,
    ) -> Result<PreviewResponse> {
        let mut document = self.get_document(id).await?;
        if document.page_count.is_none() {
            self.backfill_page_count(&mut document).await?;
        }
        let gate = PreviewGate::for_document(&document, viewer.map(|v| &v.user_id));

        let path = if gate.is_owner() || !gate.needs_truncated_copy() {
            document.file_path.clone()
        } else {
            self.ensure_preview_copy(&document, gate.max_viewable_pages())
                .await?
        };

        // Only the first-page request counts as a view.
        if !gate.is_owner() && page <= 1 {
            match self.documents.increment_view_count(id).await {
                Ok(()) => document.view_count += 1,
                Err(e) => warn!(document = %id, error = %e, "failed to count view"),
            }
        }

        let url = self
            .storage
            .signed_url(&path, self.settings.signed_url_ttl)
            .await?;
        Ok(PreviewResponse {
            preview: gate.state(page),
            document,
            url,
        })
    }

    /// Count and record the pages of a stored file whose row has none.
    async fn backfill_page_count(&self, document: &mut Document) -> Result<()> {
        let original = self.storage.download(&document.file_path).await?;
        let pages = pdf::page_count(&original)?;
        if let Err(e) = self.documents.set_page_count(document.id, pages).await {
            warn!(document = %document.id, error = %e, "failed to store page count");
        }
        document.page_count = Some(pages);
        debug!(document = %document.id, pages, "counted pages of stored file");
        Ok(())
    }

    async fn ensure_preview_copy(&self, document: &Document, pages: u32) -> Result<String> {
        let preview_path = preview_path_for(&document.file_path);
        if self.storage.exists(&preview_path).await? {
            return Ok(preview_path);
        }
        let original = self.storage.download(&document.file_path).await?;
        let truncated = pdf::truncate_to_pages(&original, pages)?;
        self.storage.upload_file(&preview_path, truncated).await?;
        debug!(document = %document.id, pages, "created preview copy");
        Ok(preview_path)
    }

    // ===== Owner operations =====

    #[instrument(skip(self, owner, form, file), fields(owner = %owner.user_id))]
    pub async fn upload(
        &self,
        owner: &Identity,
        form: &DocumentForm,
        file: Vec<u8>,
    ) -> Result<Document> {
        let validated = form.validate(None)?;
        let inspected = inspect_pdf(file, self.settings.max_upload_bytes)?;
        self.ensure_profile(owner).await?;

        let path = storage_path_for(&owner.user_id, &Uuid::new_v4().to_string());
        self.storage
            .upload_file(&path, inspected.bytes.clone())
            .await?;

        let new = validated.into_new_document(owner.user_id, path.clone(), &inspected);
        match self.documents.insert_document(new).await {
            Ok(document) => {
                info!(document = %document.id, pages = inspected.page_count, "document uploaded");
                Ok(document)
            }
            Err(e) => {
                warn!(path = %path, error = %e, "insert failed, removing uploaded file");
                if let Err(cleanup) = self.storage.remove_files(&[path]).await {
                    warn!(error = %cleanup, "failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    async fn owned_document(&self, owner: &Identity, id: DocumentId) -> Result<Document> {
        let document = self.get_document(id).await?;
        if !document.is_owned_by(&owner.user_id) {
            return Err(MarketError::Forbidden(format!(
                "document {id} belongs to another user"
            )));
        }
        Ok(document)
    }

    #[instrument(skip(self, owner, form, replacement), fields(owner = %owner.user_id))]
    pub async fn update(
        &self,
        owner: &Identity,
        id: DocumentId,
        form: &DocumentForm,
        replacement: Option<Vec<u8>>,
    ) -> Result<Document> {
        let existing = self.owned_document(owner, id).await?;
        let validated = form.validate(existing.grade_proof_url.as_deref())?;
        let inspected = replacement
            .map(|bytes| inspect_pdf(bytes, self.settings.max_upload_bytes))
            .transpose()?;

        let file = match &inspected {
            Some(inspected) => {
                let path = storage_path_for(&owner.user_id, &Uuid::new_v4().to_string());
                self.storage
                    .upload_file(&path, inspected.bytes.clone())
                    .await?;
                Some(FileReplacement {
                    file_path: path,
                    file_size: inspected.size,
                    page_count: Some(inspected.page_count),
                })
            }
            None => None,
        };
        let new_path = file.as_ref().map(|f| f.file_path.clone());

        let patch = validated.into_patch(file, existing.page_count);
        let updated = match self.documents.update_document(id, &patch).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(path) = new_path {
                    warn!(path = %path, error = %e, "update failed, removing replacement file");
                    if let Err(cleanup) = self.storage.remove_files(&[path]).await {
                        warn!(error = %cleanup, "failed to remove orphaned replacement");
                    }
                }
                return Err(e);
            }
        };

        // The preview copy depends on the file and the preview page count.
        let mut stale = vec![preview_path_for(&existing.file_path)];
        if new_path.is_some() {
            stale.push(existing.file_path.clone());
        }
        if let Err(e) = self.storage.remove_files(&stale).await {
            warn!(document = %id, error = %e, "failed to remove stale files");
        }
        info!(document = %id, replaced_file = new_path.is_some(), "document updated");
        Ok(updated)
    }

    #[instrument(skip(self, owner), fields(owner = %owner.user_id))]
    pub async fn delete_document(&self, owner: &Identity, id: DocumentId) -> Result<()> {
        let document = self.owned_document(owner, id).await?;
        self.documents.delete_document(id).await?;
        let files = vec![
            document.file_path.clone(),
            preview_path_for(&document.file_path),
        ];
        if let Err(e) = self.storage.remove_files(&files).await {
            warn!(document = %id, error = %e, "document deleted but files remain");
        }
        info!(document = %id, "document deleted");
        Ok(())
    }

    pub async fn download(&self, owner: &Identity, id: DocumentId) -> Result<DownloadedFile> {
        let document = self.owned_document(owner, id).await?;
        let profile = self.ensure_profile(owner).await?;
        let bytes = self.storage.download(&document.file_path).await?;
        let filename = document_filename(
            document.course_code.as_deref().unwrap_or_default(),
            &document.title,
            &profile.username,
        );
        Ok(DownloadedFile { filename, bytes })
    }

    // ===== Profiles =====

    pub async fn get_profile(&self, user: UserId) -> Result<Profile> {
        self.profiles
            .get_profile(user)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("profile {user}")))
    }

    /// Create the profile on first sign-in.
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<Profile> {
        if let Some(profile) = self.profiles.get_profile(identity.user_id).await? {
            return Ok(profile);
        }
        let profile = Profile::new(identity.user_id, identity.preferred_username(), Utc::now());
        match self.profiles.create_profile(&profile).await {
            Ok(()) => {
                info!(user = %identity.user_id, username = %profile.username, "profile created");
                Ok(profile)
            }
            // Lost a race with a concurrent first request.
            Err(MarketError::Conflict(_)) => self.get_profile(identity.user_id).await,
            Err(e) => Err(e),
        }
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Profile> {
        self.ensure_profile(identity).await?;
        self.profiles.update_profile(identity.user_id, update).await
    }

    /// Remove every file, document and the profile of `identity`, then revoke
    /// the identity so its tokens stop resolving.
    #[instrument(skip(self, identity), fields(user = %identity.user_id))]
    pub async fn delete_account(&self, identity: &Identity) -> Result<AccountDeletion> {
        let user = identity.user_id;
        let owned = self.documents.list_by_owner(user).await?;
        let files: Vec<String> = owned
            .iter()
            .flat_map(|d| [d.file_path.clone(), preview_path_for(&d.file_path)])
            .collect();
        self.storage.remove_files(&files).await?;

        let removed = self.documents.delete_by_owner(user).await?;
        let profile_removed = self.profiles.delete_profile(user).await?;
        self.identity.revoke(user).await?;

        let outcome = AccountDeletion {
            documents_removed: removed.len(),
            files_removed: owned.len(),
            profile_removed,
        };
        info!(?outcome, "account deleted");
        Ok(outcome)
    }
}
