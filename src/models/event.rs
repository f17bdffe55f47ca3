//! Event data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Profile;
use crate::services::timezone::{TimeInput, TimezoneError};

/// An event with its profile set resolved, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Absolute start instant
    pub start_time: DateTime<Utc>,
    /// Absolute end instant, always after `start_time`
    pub end_time: DateTime<Utc>,
    /// Timezone the times were entered in; display only
    pub timezone: String,
    pub profiles: Vec<Profile>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event as stored, referencing profiles by id
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub profile_ids: Vec<Uuid>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    /// Attach resolved profiles, keeping the stored order
    pub fn into_event(self, directory: &[Profile]) -> Event {
        let profiles = self
            .profile_ids
            .iter()
            .filter_map(|id| directory.iter().find(|p| p.id == *id).cloned())
            .collect();

        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            timezone: self.timezone,
            profiles,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Raw body of `POST /events`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC 3339 instant or wall-clock `YYYY-MM-DDTHH:MM[:SS]`
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub profiles: Option<Vec<String>>,
    pub created_by: Option<String>,
}

/// Raw body of `PUT /events/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub profiles: Option<Vec<String>>,
    pub updated_by: Option<String>,
}

/// A validated event draft with absolute instants
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub profiles: Vec<Uuid>,
    pub created_by: String,
}

/// A validated update whose times may still be wall-clock readings
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEventDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<TimeInput>,
    pub end_time: Option<TimeInput>,
    pub timezone: Option<String>,
    pub profiles: Option<Vec<Uuid>>,
    pub updated_by: String,
}

impl UpdateEventDraft {
    /// Resolve wall-clock times in the patch timezone, or in the event's
    /// stored authoring timezone when the patch does not change it.
    pub fn resolve(&self, stored_timezone: &str) -> Result<EventPatch, TimezoneError> {
        let tz = self.timezone.as_deref().unwrap_or(stored_timezone);

        Ok(EventPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            start_time: self.start_time.map(|t| t.resolve(tz)).transpose()?,
            end_time: self.end_time.map(|t| t.resolve(tz)).transpose()?,
            timezone: self.timezone.clone(),
            profiles: self.profiles.clone(),
        })
    }
}

/// Partial set of new field values; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub profiles: Option<Vec<Uuid>>,
}

impl EventPatch {
    /// Merge the present fields onto `record`
    pub fn apply_to(&self, record: &EventRecord) -> EventRecord {
        let mut merged = record.clone();
        if let Some(ref title) = self.title {
            merged.title = title.clone();
        }
        if let Some(ref description) = self.description {
            merged.description = Some(description.clone());
        }
        if let Some(start) = self.start_time {
            merged.start_time = start;
        }
        if let Some(end) = self.end_time {
            merged.end_time = end;
        }
        if let Some(ref timezone) = self.timezone {
            merged.timezone = timezone.clone();
        }
        if let Some(ref profiles) = self.profiles {
            merged.profile_ids = profiles.clone();
        }
        merged
    }
}

/// Query string of `GET /events`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub profile_id: Option<String>,
}

/// Query string of `GET /events/{id}/display`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayQuery {
    /// Viewer timezone; defaults to the event's authoring timezone
    pub timezone: Option<String>,
    /// Preset (`iso`, `datetime-local`, `display`) or strftime pattern
    pub format: Option<String>,
}

/// An event's times re-projected into a viewer's timezone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDisplay {
    pub event_id: Uuid,
    pub timezone: String,
    /// Zone abbreviation in force at the event start
    pub abbreviation: String,
    pub start: String,
    pub end: String,
    pub authoring_timezone: String,
}
