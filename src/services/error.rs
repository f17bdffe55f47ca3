//! Error types for the scheduling core

use thiserror::Error;
use validator::ValidationErrors;

use super::timezone::TimezoneError;

#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Field-level constraint violation, correctable by the caller
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The addressed event or profile does not exist
    #[error("{0}")]
    NotFound(String),

    /// The requested profile set could not be fully resolved
    #[error("One or more profiles not found")]
    ProfileNotFound,

    #[error("Profile with name '{0}' already exists")]
    DuplicateName(String),

    #[error(transparent)]
    Timezone(#[from] TimezoneError),

    /// Persistence failure; never retried
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl SchedulingError {
    pub fn event_not_found() -> Self {
        SchedulingError::NotFound("Event not found".to_string())
    }

    pub fn profile_not_found() -> Self {
        SchedulingError::NotFound("Profile not found".to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
