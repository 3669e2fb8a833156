use async_trait::async_trait;
use notemarket_model::{Profile, ProfileUpdate, UserId};

use crate::error::Result;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>>;
    /// Fails with `Conflict` when the profile already exists.
    async fn create_profile(&self, profile: &Profile) -> Result<()>;
    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<Profile>;
    /// Returns whether a row was removed.
    async fn delete_profile(&self, id: UserId) -> Result<bool>;
}
