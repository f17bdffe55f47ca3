//! Profile repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid, placeholders, BIND_CHUNK};
use crate::models::{NewProfile, Profile};
use crate::services::timezone::serialize_instant;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    timezone: String,
    created_at: String,
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All profiles, newest first
    pub async fn list(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, timezone, created_at
            FROM profiles
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list profiles")?;

        rows.into_iter().map(row_to_profile).collect()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, timezone, created_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get profile")?;

        row.map(row_to_profile).transpose()
    }

    /// Profiles among `ids` that exist, in no particular order
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
        let mut profiles = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(BIND_CHUNK) {
            let sql = format!(
                "SELECT id, name, timezone, created_at FROM profiles WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_as::<_, ProfileRow>(&sql);
            for id in chunk {
                query = query.bind(id.to_string());
            }

            let rows = query
                .fetch_all(self.pool)
                .await
                .context("Failed to load profiles")?;

            for row in rows {
                profiles.push(row_to_profile(row)?);
            }
        }

        Ok(profiles)
    }

    /// Number of distinct stored profiles among `ids`
    ///
    /// Callers bound `ids` by the event profile limit, so one query suffices.
    pub async fn count_existing(&self, ids: &[Uuid]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM profiles WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let count = query
            .fetch_one(self.pool)
            .await
            .context("Failed to count profiles")?;

        Ok(count as usize)
    }

    /// Whether another profile already uses `name` (case-sensitive)
    pub async fn name_taken(&self, name: &str, exclude: Option<Uuid>) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM profiles
            WHERE name = ? AND (? IS NULL OR id != ?)
            "#,
        )
        .bind(name)
        .bind(exclude.map(|id| id.to_string()))
        .bind(exclude.map(|id| id.to_string()))
        .fetch_one(self.pool)
        .await
        .context("Failed to check profile name")?;

        Ok(count > 0)
    }

    pub async fn insert(&self, profile: &NewProfile) -> Result<Profile> {
        let id = Uuid::new_v4();
        let now = serialize_instant(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, timezone, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&profile.name)
        .bind(&profile.timezone)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create profile")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created profile")
    }

    pub async fn update(&self, id: Uuid, name: &str, timezone: &str) -> Result<Option<Profile>> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET name = ?, timezone = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(timezone)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update profile")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }
}

fn row_to_profile(row: ProfileRow) -> Result<Profile> {
    Ok(Profile {
        id: parse_db_uuid(&row.id)?,
        name: row.name,
        timezone: row.timezone,
        created_at: parse_db_timestamp(&row.created_at)?,
    })
}
