//! Event store
//!
//! Owns the event lifecycle: creation, partial update with audit logging,
//! listing, deletion, and re-projection into a viewer's timezone.
//!
//! Stored instants are authoritative. The event timezone only records
//! which zone the times were entered in, so changing it never moves
//! the event.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::audit;
use super::error::{Result, SchedulingError};
use super::timezone::{self, FormatSpec};
use crate::db::{DbPool, EventLogRepository, EventRepository, ProfileRepository};
use crate::models::{
    AuditLogEntry, CreateEventRequest, DisplayQuery, Event, EventDisplay, EventQuery, EventRecord,
    UpdateEventRequest,
};
use crate::utils::validation::{
    validate_create_event, validate_event_window, validate_update_event,
};

pub struct EventService<'a> {
    events: EventRepository<'a>,
    profiles: ProfileRepository<'a>,
    logs: EventLogRepository<'a>,
}

impl<'a> EventService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            events: EventRepository::new(pool),
            profiles: ProfileRepository::new(pool),
            logs: EventLogRepository::new(pool),
        }
    }

    pub async fn create(&self, req: &CreateEventRequest) -> Result<Event> {
        let new_event = validate_create_event(req)?;
        self.ensure_profiles(&new_event.profiles).await?;

        let record = self.events.insert(&new_event).await?;
        info!(
            event_id = %record.id,
            timezone = %record.timezone,
            profiles = record.profile_ids.len(),
            "Created event"
        );

        self.resolve(record).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        let record = self.record(id).await?;
        self.resolve(record).await
    }

    /// Events ordered by start time. A `profileId` that is not a valid id
    /// matches nothing.
    pub async fn list(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let filter = match query.profile_id.as_deref() {
            None => None,
            Some(raw) => match Uuid::parse_str(raw.trim()) {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!(profile_id = %raw, "Ignoring malformed profile filter");
                    return Ok(Vec::new());
                }
            },
        };

        let records = self.events.list_records(filter).await?;

        let mut ids: Vec<Uuid> = records
            .iter()
            .flat_map(|r| r.profile_ids.iter().copied())
            .collect();
        ids.sort();
        ids.dedup();
        let directory = self.profiles.find_by_ids(&ids).await?;

        Ok(records
            .into_iter()
            .map(|record| record.into_event(&directory))
            .collect())
    }

    /// Apply a partial update and record what changed.
    ///
    /// Wall-clock times are read in the patch timezone when one is given,
    /// otherwise in the stored timezone. No log entry is written when
    /// nothing differs.
    pub async fn update(&self, id: Uuid, req: &UpdateEventRequest) -> Result<Event> {
        let draft = validate_update_event(req)?;
        let record = self.record(id).await?;

        let patch = draft.resolve(&record.timezone)?;
        if let Some(ref profiles) = patch.profiles {
            self.ensure_profiles(profiles).await?;
        }

        let changes = audit::diff(&record, &patch);

        let mut merged = patch.apply_to(&record);
        validate_event_window(merged.start_time, merged.end_time)?;

        let now = Utc::now();
        merged.updated_at = now;
        self.events.replace(&merged).await?;

        if changes.is_empty() {
            debug!(event_id = %id, "Event update changed nothing");
        } else {
            self.logs.insert(id, &changes, &draft.updated_by, now).await?;
            info!(
                event_id = %id,
                updated_by = %draft.updated_by,
                changes = changes.len(),
                "Updated event"
            );
        }

        self.get(id).await
    }

    /// Delete the event together with its audit trail
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.events.delete(id).await? {
            return Err(SchedulingError::event_not_found());
        }
        info!(event_id = %id, "Deleted event");
        Ok(())
    }

    /// Audit trail of an event, newest first
    pub async fn logs(&self, id: Uuid) -> Result<Vec<AuditLogEntry>> {
        self.record(id).await?;
        Ok(self.logs.list_for_event(id).await?)
    }

    /// Project the event's instants into the viewer's timezone, falling
    /// back to the timezone the event was authored in.
    pub async fn display(&self, id: Uuid, query: &DisplayQuery) -> Result<EventDisplay> {
        let record = self.record(id).await?;

        let tz = query
            .timezone
            .as_deref()
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .unwrap_or(record.timezone.as_str());
        let spec = query
            .format
            .as_deref()
            .map(FormatSpec::parse)
            .unwrap_or_default();

        Ok(EventDisplay {
            event_id: record.id,
            timezone: tz.to_string(),
            abbreviation: timezone::abbreviation(tz, record.start_time)?,
            start: timezone::format(record.start_time, tz, &spec)?,
            end: timezone::format(record.end_time, tz, &spec)?,
            authoring_timezone: record.timezone.clone(),
        })
    }

    async fn record(&self, id: Uuid) -> Result<EventRecord> {
        self.events
            .get_record(id)
            .await?
            .ok_or_else(SchedulingError::event_not_found)
    }

    /// Every id must name a stored profile; duplicates count as missing
    async fn ensure_profiles(&self, ids: &[Uuid]) -> Result<()> {
        if self.profiles.count_existing(ids).await? != ids.len() {
            return Err(SchedulingError::ProfileNotFound);
        }
        Ok(())
    }

    async fn resolve(&self, record: EventRecord) -> Result<Event> {
        let directory = self.profiles.find_by_ids(&record.profile_ids).await?;
        Ok(record.into_event(&directory))
    }
}
