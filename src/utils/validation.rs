//! Input validation
//!
//! Each request body has one named validation function that either yields
//! the validated value or the complete set of field errors, keyed by the
//! JSON field name.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::models::{
    CreateEventRequest, CreateProfileRequest, NewEvent, NewProfile, ProfilePatch,
    UpdateEventDraft, UpdateEventRequest, UpdateProfileRequest, UNKNOWN_EDITOR,
};
use crate::services::timezone::{is_known_timezone, TimeInput};

const NAME_LEN: (usize, usize) = (2, 50);
const TITLE_LEN: (usize, usize) = (3, 100);
const DESCRIPTION_MAX: usize = 500;
const PROFILES_MAX: usize = 100;

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn finish<T>(errors: ValidationErrors, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
    if errors.is_empty() {
        Ok(value())
    } else {
        Err(errors)
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
    label: &str,
) {
    let len = value.chars().count();
    if len < min {
        errors.add(
            field,
            field_error("length", format!("{} must be at least {} characters", label, min)),
        );
    } else if len > max {
        errors.add(
            field,
            field_error("length", format!("{} cannot exceed {} characters", label, max)),
        );
    }
}

fn check_timezone(errors: &mut ValidationErrors, tz: &str) {
    if !is_known_timezone(tz) {
        errors.add(
            "timezone",
            field_error("timezone", format!("Unknown timezone '{}'", tz)),
        );
    }
}

fn required(errors: &mut ValidationErrors, field: &'static str, label: &str) {
    errors.add(field, field_error("required", format!("{} is required", label)));
}

fn check_description(errors: &mut ValidationErrors, description: Option<&str>) -> Option<String> {
    let description = description.map(str::trim)?;
    if description.chars().count() > DESCRIPTION_MAX {
        errors.add(
            "description",
            field_error(
                "length",
                format!("Description cannot exceed {} characters", DESCRIPTION_MAX),
            ),
        );
    }
    Some(description.to_string())
}

fn bad_time(errors: &mut ValidationErrors, field: &'static str) {
    errors.add(
        field,
        field_error("datetime", "Expected an RFC 3339 instant or YYYY-MM-DDTHH:MM"),
    );
}

fn parse_time(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<TimeInput> {
    match TimeInput::parse(raw) {
        Ok(input) => Some(input),
        Err(_) => {
            bad_time(errors, field);
            None
        }
    }
}

fn parse_profiles(errors: &mut ValidationErrors, raw: &[String]) -> Vec<Uuid> {
    if raw.is_empty() {
        errors.add(
            "profiles",
            field_error("length", "At least one profile must be selected"),
        );
        return Vec::new();
    }
    if raw.len() > PROFILES_MAX {
        errors.add(
            "profiles",
            field_error(
                "length",
                format!("At most {} profiles can be selected", PROFILES_MAX),
            ),
        );
        return Vec::new();
    }

    let ids: Vec<Uuid> = raw.iter().filter_map(|id| Uuid::parse_str(id.trim()).ok()).collect();
    if ids.len() != raw.len() {
        errors.add("profiles", field_error("invalid_id", "Invalid profile ID format"));
    }
    ids
}

fn check_window(errors: &mut ValidationErrors, start: DateTime<Utc>, end: DateTime<Utc>) {
    if end <= start {
        errors.add(
            "endTime",
            field_error("end_before_start", "End time must be after start time"),
        );
    }
}

/// Check the `end > start` invariant of an event
pub fn validate_event_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_window(&mut errors, start, end);
    finish(errors, || ())
}

/// Validate `POST /profiles`; a missing timezone becomes `default_timezone`
pub fn validate_create_profile(
    req: &CreateProfileRequest,
    default_timezone: &str,
) -> Result<NewProfile, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if req.name.is_none() {
        required(&mut errors, "name", "Profile name");
    } else {
        check_length(&mut errors, "name", name, NAME_LEN, "Name");
    }

    let timezone = req.timezone.as_deref().map(str::trim).unwrap_or(default_timezone);
    check_timezone(&mut errors, timezone);

    finish(errors, || NewProfile {
        name: name.to_string(),
        timezone: timezone.to_string(),
    })
}

/// Validate `PUT /profiles/{id}`
pub fn validate_update_profile(req: &UpdateProfileRequest) -> Result<ProfilePatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = req.name.as_deref().map(str::trim);
    if let Some(name) = name {
        check_length(&mut errors, "name", name, NAME_LEN, "Name");
    }

    let timezone = req.timezone.as_deref().map(str::trim);
    if let Some(tz) = timezone {
        check_timezone(&mut errors, tz);
    }

    finish(errors, || ProfilePatch {
        name: name.map(str::to_string),
        timezone: timezone.map(str::to_string),
    })
}

/// Validate `POST /events`, resolving wall-clock times in the event timezone
pub fn validate_create_event(req: &CreateEventRequest) -> Result<NewEvent, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = req.title.as_deref().map(str::trim).unwrap_or_default();
    if req.title.is_none() {
        required(&mut errors, "title", "Event title");
    } else {
        check_length(&mut errors, "title", title, TITLE_LEN, "Title");
    }

    let description = check_description(&mut errors, req.description.as_deref());

    let timezone = req.timezone.as_deref().map(str::trim);
    match timezone {
        Some(tz) => check_timezone(&mut errors, tz),
        None => required(&mut errors, "timezone", "Timezone"),
    }
    let zone = timezone.filter(|tz| is_known_timezone(tz));

    let mut resolve = |field: &'static str, raw: Option<&str>, label: &str| {
        let Some(raw) = raw else {
            required(&mut errors, field, label);
            return None;
        };
        let input = parse_time(&mut errors, field, raw)?;
        let resolved = match (input, zone) {
            (TimeInput::Instant(_), _) => input.resolve("UTC"),
            (TimeInput::WallClock(_), Some(tz)) => input.resolve(tz),
            (TimeInput::WallClock(_), None) => return None,
        };
        resolved.map_err(|_| bad_time(&mut errors, field)).ok()
    };
    let start_time = resolve("startTime", req.start_time.as_deref(), "Start time");
    let end_time = resolve("endTime", req.end_time.as_deref(), "End time");

    if let (Some(start), Some(end)) = (start_time, end_time) {
        check_window(&mut errors, start, end);
    }

    let profiles = match req.profiles {
        Some(ref raw) => parse_profiles(&mut errors, raw),
        None => {
            required(&mut errors, "profiles", "Profiles");
            Vec::new()
        }
    };

    let created_by = req.created_by.as_deref().map(str::trim).unwrap_or_default();
    if created_by.is_empty() {
        required(&mut errors, "createdBy", "Creator");
    }

    match (start_time, end_time, zone) {
        (Some(start_time), Some(end_time), Some(tz)) if errors.is_empty() => Ok(NewEvent {
            title: title.to_string(),
            description,
            start_time,
            end_time,
            timezone: tz.to_string(),
            profiles,
            created_by: created_by.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Validate `PUT /events/{id}`; wall-clock times stay unresolved until
/// the stored event's timezone is known
pub fn validate_update_event(req: &UpdateEventRequest) -> Result<UpdateEventDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = req.title.as_deref().map(str::trim);
    if let Some(title) = title {
        check_length(&mut errors, "title", title, TITLE_LEN, "Title");
    }

    let description = check_description(&mut errors, req.description.as_deref());

    let timezone = req.timezone.as_deref().map(str::trim);
    if let Some(tz) = timezone {
        check_timezone(&mut errors, tz);
    }

    let start_time = req
        .start_time
        .as_deref()
        .and_then(|raw| parse_time(&mut errors, "startTime", raw));
    let end_time = req
        .end_time
        .as_deref()
        .and_then(|raw| parse_time(&mut errors, "endTime", raw));

    if let (Some(TimeInput::Instant(start)), Some(TimeInput::Instant(end))) = (start_time, end_time) {
        check_window(&mut errors, start, end);
    }

    let profiles = req.profiles.as_deref().map(|raw| parse_profiles(&mut errors, raw));

    let updated_by = req
        .updated_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_EDITOR);

    finish(errors, || UpdateEventDraft {
        title: title.map(str::to_string),
        description,
        start_time,
        end_time,
        timezone: timezone.map(str::to_string),
        profiles,
        updated_by: updated_by.to_string(),
    })
}
