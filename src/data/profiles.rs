use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{Action, ServiceError, StorageError};
use crate::utils::structures::{blank_to_none, ProfileForm};

/// Optional descriptive data layered on top of an account. A missing
/// profile is normal; callers fall back to the account email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn display_name<'a>(profile: Option<&'a UserProfile>, email: &'a str) -> &'a str {
        profile
            .and_then(|p| p.full_name.as_deref())
            .unwrap_or(email)
    }
}

pub trait ProfileStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError>;
    fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

pub fn load_profile<S>(store: &S, user_id: &str) -> Result<Option<UserProfile>, ServiceError>
where
    S: ProfileStore + ?Sized,
{
    store
        .get_profile(user_id)
        .map_err(|e| ServiceError::storage(Action::LoadProfile, e))
}

/// Creates or replaces the caller's profile. Blank fields are stored as NULL.
pub fn save_profile<S>(store: &S, user_id: &str, form: &ProfileForm) -> Result<UserProfile, ServiceError>
where
    S: ProfileStore + ?Sized,
{
    let profile = UserProfile {
        id: user_id.to_string(),
        full_name: blank_to_none(&form.full_name),
        company: blank_to_none(&form.company),
        bio: blank_to_none(&form.bio),
        website: blank_to_none(&form.website),
        updated_at: Utc::now(),
    };

    store
        .upsert_profile(&profile)
        .map_err(|e| ServiceError::storage(Action::SaveProfile, e))?;
    tracing::info!(user_id, "profile updated");
    Ok(profile)
}
