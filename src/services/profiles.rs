//! Profile directory
//!
//! Profiles are named, timezone-tagged identities. Names are unique
//! (case-sensitive, compared after trimming); profiles are never deleted.

use tracing::info;
use uuid::Uuid;

use super::error::{Result, SchedulingError};
use crate::db::{DbPool, ProfileRepository};
use crate::models::{CreateProfileRequest, Profile, UpdateProfileRequest};
use crate::utils::validation::{validate_create_profile, validate_update_profile};

pub struct ProfileService<'a> {
    repo: ProfileRepository<'a>,
}

impl<'a> ProfileService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            repo: ProfileRepository::new(pool),
        }
    }

    /// Create a profile; a missing timezone falls back to `default_timezone`
    pub async fn create(
        &self,
        req: &CreateProfileRequest,
        default_timezone: &str,
    ) -> Result<Profile> {
        let new_profile = validate_create_profile(req, default_timezone)?;

        if self.repo.name_taken(&new_profile.name, None).await? {
            return Err(SchedulingError::DuplicateName(new_profile.name));
        }

        let profile = self.repo.insert(&new_profile).await?;
        info!(profile_id = %profile.id, name = %profile.name, "Created profile");
        Ok(profile)
    }

    /// All profiles, newest first
    pub async fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Profile> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(SchedulingError::profile_not_found)
    }

    /// Apply a partial update. Renaming to the profile's own current name
    /// is not a conflict.
    pub async fn update(&self, id: Uuid, req: &UpdateProfileRequest) -> Result<Profile> {
        let patch = validate_update_profile(req)?;
        let existing = self.get(id).await?;

        if let Some(ref name) = patch.name {
            if self.repo.name_taken(name, Some(id)).await? {
                return Err(SchedulingError::DuplicateName(name.clone()));
            }
        }

        let name = patch.name.unwrap_or(existing.name);
        let timezone = patch.timezone.unwrap_or(existing.timezone);

        let profile = self
            .repo
            .update(id, &name, &timezone)
            .await?
            .ok_or_else(SchedulingError::profile_not_found)?;

        info!(profile_id = %id, "Updated profile");
        Ok(profile)
    }
}
