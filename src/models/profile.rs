//! Profile data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, timezone-tagged identity that events are scheduled for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    /// Unique (case-sensitive) display name, 2-50 characters
    pub name: String,
    /// IANA timezone the profile views events in
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

/// Raw body of `POST /profiles`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub name: Option<String>,
    pub timezone: Option<String>,
}

/// Raw body of `PUT /profiles/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub timezone: Option<String>,
}

/// A validated profile ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub name: String,
    pub timezone: String,
}

/// Validated partial update of a profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub timezone: Option<String>,
}
