//! Event audit log repository
//!
//! Log entries are append-only. The change list is stored as a JSON array.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid};
use crate::models::{AuditLogEntry, FieldChange};
use crate::services::timezone::serialize_instant;

#[derive(Debug, sqlx::FromRow)]
struct EventLogRow {
    id: String,
    event_id: String,
    changes: String,
    updated_by: String,
    updated_at: String,
}

pub struct EventLogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventLogRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        event_id: Uuid,
        changes: &[FieldChange],
        updated_by: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<AuditLogEntry> {
        let id = Uuid::new_v4();
        let changes_json =
            serde_json::to_string(changes).context("Failed to serialize event changes")?;

        sqlx::query(
            r#"
            INSERT INTO event_logs (id, event_id, changes, updated_by, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(event_id.to_string())
        .bind(&changes_json)
        .bind(updated_by)
        .bind(serialize_instant(updated_at))
        .execute(self.pool)
        .await
        .context("Failed to create event log")?;

        Ok(AuditLogEntry {
            id,
            event_id,
            changes: changes.to_vec(),
            updated_by: updated_by.to_string(),
            updated_at,
        })
    }

    /// Logs for one event, newest first
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, EventLogRow>(
            r#"
            SELECT id, event_id, changes, updated_by, updated_at
            FROM event_logs
            WHERE event_id = ?
            ORDER BY updated_at DESC, rowid DESC
            "#,
        )
        .bind(event_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list event logs")?;

        rows.into_iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: EventLogRow) -> Result<AuditLogEntry> {
    Ok(AuditLogEntry {
        id: parse_db_uuid(&row.id)?,
        event_id: parse_db_uuid(&row.event_id)?,
        changes: serde_json::from_str(&row.changes)
            .with_context(|| format!("Invalid stored changes for log {}", row.id))?,
        updated_by: row.updated_by,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}
