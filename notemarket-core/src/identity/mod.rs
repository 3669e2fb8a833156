//! Identity port. Tokens are issued by an external provider and only
//! verified here.

pub mod jwt;

use async_trait::async_trait;
use notemarket_model::UserId;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use jwt::{Claims, JwtIdentityProvider, UserMetadata};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            username: None,
        }
    }

    /// Username for a fresh profile: the chosen username, else the local
    /// part of the email, else a generic fallback.
    pub fn preferred_username(&self) -> String {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|u| !u.is_empty())
            })
            .unwrap_or("bruker")
            .to_string()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` for unknown, expired or revoked tokens.
    async fn current_user(&self, token: &str) -> Result<Option<Identity>>;
    /// Stop accepting tokens for a deleted account.
    async fn revoke(&self, user: UserId) -> Result<()>;
}
