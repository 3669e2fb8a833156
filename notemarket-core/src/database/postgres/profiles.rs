use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notemarket_model::{Profile, ProfileUpdate, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::profiles::ProfileRepository;
use crate::error::{MarketError, Result};

#[derive(Debug, Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    full_name: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: UserId(row.id),
            username: row.username,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PROFILE_COLUMNS: &str = "id, username, full_name, avatar_url, created_at, updated_at";

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Profile::from))
    }

    async fn create_profile(&self, profile: &Profile) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, username, full_name, avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id.to_uuid())
        .bind(&profile.username)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(MarketError::Conflict(format!(
                "profile {} already exists",
                profile.id
            )));
        }
        Ok(())
    }

    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<Profile> {
        let mut profile = self
            .get_profile(id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("profile {id}")))?;
        update.apply(&mut profile, Utc::now());

        sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = $2, avatar_url = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(profile.updated_at)
        .execute(self.pool())
        .await?;
        Ok(profile)
    }

    async fn delete_profile(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id.to_uuid())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
