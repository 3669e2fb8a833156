use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use notemarket_model::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Identity, IdentityProvider};
use crate::error::{MarketError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Access-token claims in the shape the hosted auth provider issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// HS256 verifier with in-process revocation of deleted accounts.
pub struct JwtIdentityProvider {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
    revoked: DashSet<UserId>,
}

impl std::fmt::Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityProvider")
            .field("revoked", &self.revoked.len())
            .finish_non_exhaustive()
    }
}

impl JwtIdentityProvider {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(MarketError::Internal("JWT secret must not be empty".into()));
        }
        Ok(Self {
            decoding: DecodingKey::from_secret(secret),
            encoding: EncodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            revoked: DashSet::new(),
        })
    }

    /// Mint a token with the shared secret. Used by tests and local tooling.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            iat: now,
            exp: now + i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2),
            email: identity.email.clone(),
            user_metadata: UserMetadata {
                username: identity.username.clone(),
            },
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| MarketError::Internal(format!("failed to sign token: {e}")))
    }

    pub fn is_revoked(&self, user: &UserId) -> bool {
        self.revoked.contains(user)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn current_user(&self, token: &str) -> Result<Option<Identity>> {
        let claims = match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "rejected bearer token");
                return Ok(None);
            }
        };
        let Ok(user_id) = claims.sub.parse::<UserId>() else {
            debug!(sub = %claims.sub, "token subject is not a user id");
            return Ok(None);
        };
        if self.is_revoked(&user_id) {
            return Ok(None);
        }
        Ok(Some(Identity {
            user_id,
            email: claims.email,
            username: claims.user_metadata.username,
        }))
    }

    async fn revoke(&self, user: UserId) -> Result<()> {
        self.revoked.insert(user);
        info!(user = %user, "identity revoked");
        Ok(())
    }
}
