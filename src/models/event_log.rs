//! Event audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event fields whose edits are recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackedField {
    Title,
    Description,
    StartTime,
    EndTime,
    Timezone,
    Profiles,
}

impl TrackedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedField::Title => "title",
            TrackedField::Description => "description",
            TrackedField::StartTime => "startTime",
            TrackedField::EndTime => "endTime",
            TrackedField::Timezone => "timezone",
            TrackedField::Profiles => "profiles",
        }
    }
}

impl std::fmt::Display for TrackedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field that differed in an update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: TrackedField,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

/// Immutable record of a single update to an event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Never empty: updates that change nothing are not logged
    pub changes: Vec<FieldChange>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Attribution used when an update does not say who made it
pub const UNKNOWN_EDITOR: &str = "Unknown";
