//! Event repository
//!
//! Events are stored with absolute UTC instants as RFC 3339 text at
//! millisecond precision, so text order equals time order. Profile
//! membership lives in `event_profiles`, keeping the submitted order.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid, placeholders, BIND_CHUNK};
use crate::models::{EventRecord, NewEvent};
use crate::services::timezone::serialize_instant;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: Option<String>,
    start_time: String,
    end_time: String,
    timezone: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    event_id: String,
    profile_id: String,
}

pub struct EventRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, event: &NewEvent) -> Result<EventRecord> {
        let id = Uuid::new_v4();
        let now = serialize_instant(Utc::now());

        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, start_time, end_time, timezone,
                                created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&event.title)
        .bind(&event.description)
        .bind(serialize_instant(event.start_time))
        .bind(serialize_instant(event.end_time))
        .bind(&event.timezone)
        .bind(&event.created_by)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to create event")?;

        insert_memberships(&mut tx, id, &event.profiles).await?;

        tx.commit().await.context("Failed to commit event")?;

        self.get_record(id)
            .await?
            .context("Failed to retrieve created event")
    }

    pub async fn get_record(&self, id: Uuid) -> Result<Option<EventRecord>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, start_time, end_time, timezone,
                   created_by, created_at, updated_at
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get event")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut records = self.attach_memberships(vec![row]).await?;
        Ok(records.pop())
    }

    /// Events ordered by start time, optionally limited to one profile
    pub async fn list_records(&self, profile_id: Option<Uuid>) -> Result<Vec<EventRecord>> {
        let rows = match profile_id {
            Some(profile_id) => sqlx::query_as::<_, EventRow>(
                r#"
                SELECT id, title, description, start_time, end_time, timezone,
                       created_by, created_at, updated_at
                FROM events
                WHERE id IN (SELECT event_id FROM event_profiles WHERE profile_id = ?)
                ORDER BY start_time ASC, rowid ASC
                "#,
            )
            .bind(profile_id.to_string())
            .fetch_all(self.pool)
            .await
            .context("Failed to list events for profile")?,
            None => sqlx::query_as::<_, EventRow>(
                r#"
                SELECT id, title, description, start_time, end_time, timezone,
                       created_by, created_at, updated_at
                FROM events
                ORDER BY start_time ASC, rowid ASC
                "#,
            )
            .fetch_all(self.pool)
            .await
            .context("Failed to list events")?,
        };

        self.attach_memberships(rows).await
    }

    /// Overwrite the stored event and its membership with `record`
    pub async fn replace(&self, record: &EventRecord) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, start_time = ?, end_time = ?,
                timezone = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.title)
        .bind(&record.description)
        .bind(serialize_instant(record.start_time))
        .bind(serialize_instant(record.end_time))
        .bind(&record.timezone)
        .bind(serialize_instant(record.updated_at))
        .bind(record.id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update event")?;

        sqlx::query("DELETE FROM event_profiles WHERE event_id = ?")
            .bind(record.id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to clear event profiles")?;

        insert_memberships(&mut tx, record.id, &record.profile_ids).await?;

        tx.commit().await.context("Failed to commit event update")?;
        Ok(())
    }

    /// Remove the event with its membership and audit logs
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM event_logs WHERE event_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete event logs")?;

        sqlx::query("DELETE FROM event_profiles WHERE event_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete event profiles")?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete event")?;

        tx.commit().await.context("Failed to commit event deletion")?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach_memberships(&self, rows: Vec<EventRow>) -> Result<Vec<EventRecord>> {
        let mut memberships = Vec::new();

        for chunk in rows.chunks(BIND_CHUNK) {
            let sql = format!(
                "SELECT event_id, profile_id FROM event_profiles WHERE event_id IN ({}) \
                 ORDER BY event_id, position",
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_as::<_, MembershipRow>(&sql);
            for row in chunk {
                query = query.bind(row.id.as_str());
            }

            memberships.extend(
                query
                    .fetch_all(self.pool)
                    .await
                    .context("Failed to load event profiles")?,
            );
        }

        let mut by_event: HashMap<String, Vec<Uuid>> = HashMap::new();
        for membership in memberships {
            by_event
                .entry(membership.event_id)
                .or_default()
                .push(parse_db_uuid(&membership.profile_id)?);
        }

        rows.into_iter()
            .map(|row| {
                let profile_ids = by_event.remove(&row.id).unwrap_or_default();
                row_to_record(row, profile_ids)
            })
            .collect()
    }
}

async fn insert_memberships(
    tx: &mut Transaction<'_, Sqlite>,
    event_id: Uuid,
    profile_ids: &[Uuid],
) -> Result<()> {
    for (position, profile_id) in profile_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO event_profiles (event_id, profile_id, position)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(event_id.to_string())
        .bind(profile_id.to_string())
        .bind(position as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to link event profile")?;
    }
    Ok(())
}

fn row_to_record(row: EventRow, profile_ids: Vec<Uuid>) -> Result<EventRecord> {
    Ok(EventRecord {
        id: parse_db_uuid(&row.id)?,
        title: row.title,
        description: row.description,
        start_time: parse_db_timestamp(&row.start_time)?,
        end_time: parse_db_timestamp(&row.end_time)?,
        timezone: row.timezone,
        profile_ids,
        created_by: row.created_by,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}
