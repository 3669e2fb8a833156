use chrono::{DateTime, Utc};

use crate::ids::UserId;

/// Public profile of a marketplace user, one-to-one with the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: UserId, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: username.into(),
            full_name: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Single upper-case letter shown when no avatar is set.
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }
}

/// Owner edit of the mutable profile fields. Blank values clear the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile, now: DateTime<Utc>) {
        profile.full_name = non_blank(self.full_name.as_deref());
        profile.avatar_url = non_blank(self.avatar_url.as_deref());
        profile.updated_at = now;
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
