//! Change audit engine
//!
//! Computes the field-level difference between a stored event and a patch.
//! Only fields present in the patch are compared, so the result is the
//! minimal set of changes the patch would make. An empty result means the
//! update is a no-op for auditing purposes and no log entry is written.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{EventPatch, EventRecord, FieldChange, TrackedField};
use crate::services::timezone::serialize_instant;

/// Diff `patch` against `old`, in a fixed field order.
pub fn diff(old: &EventRecord, patch: &EventPatch) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if let Some(ref title) = patch.title {
        let title = title.trim();
        if title != old.title {
            changes.push(change(TrackedField::Title, json!(old.title), json!(title)));
        }
    }

    if let Some(ref description) = patch.description {
        if old.description.as_deref() != Some(description.as_str()) {
            changes.push(change(
                TrackedField::Description,
                json!(old.description),
                json!(description),
            ));
        }
    }

    if let Some(start) = patch.start_time {
        let (before, after) = (serialize_instant(old.start_time), serialize_instant(start));
        if before != after {
            changes.push(change(TrackedField::StartTime, json!(before), json!(after)));
        }
    }

    if let Some(end) = patch.end_time {
        let (before, after) = (serialize_instant(old.end_time), serialize_instant(end));
        if before != after {
            changes.push(change(TrackedField::EndTime, json!(before), json!(after)));
        }
    }

    if let Some(ref timezone) = patch.timezone {
        if *timezone != old.timezone {
            changes.push(change(TrackedField::Timezone, json!(old.timezone), json!(timezone)));
        }
    }

    if let Some(ref profiles) = patch.profiles {
        let before = sorted_ids(&old.profile_ids);
        let after = sorted_ids(profiles);
        if before != after {
            changes.push(change(TrackedField::Profiles, json!(before), json!(after)));
        }
    }

    changes
}

fn change(field: TrackedField, old_value: Value, new_value: Value) -> FieldChange {
    FieldChange {
        field,
        old_value,
        new_value,
    }
}

/// Profile sets compare order-independently; the log stores sorted ids.
fn sorted_ids(ids: &[Uuid]) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    ids.sort();
    ids
}
