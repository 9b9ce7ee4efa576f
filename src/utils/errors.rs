use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Problems the person filling in a form can fix themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequiredFields,

    #[error("Invalid job type selected")]
    InvalidJobType,

    #[error("Salary must be a whole, non-negative number")]
    InvalidSalary,

    #[error("Minimum salary cannot be greater than maximum salary")]
    SalaryRangeInvalid,

    #[error("Please provide either an application email or URL")]
    MissingApplicationMethod,

    #[error("Please provide a valid application email")]
    InvalidApplicationEmail,

    #[error("Please provide a valid application URL")]
    InvalidApplicationUrl,
}

/// Failures coming out of the row store. These carry full detail and are
/// only ever logged, never shown to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("refusing to {0} rows without a filter")]
    UnscopedMutation(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// What the service was doing when the store failed. The `Display` form is
/// the generic message handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateJob,
    UpdateJob,
    DeleteJob,
    ToggleStatus,
    SearchJobs,
    LoadJob,
    LoadDashboard,
    LoadProfile,
    SaveProfile,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Action::CreateJob => "Failed to create job posting. Please try again.",
            Action::UpdateJob => "Failed to update job posting",
            Action::DeleteJob => "Failed to delete job",
            Action::ToggleStatus => "Failed to update job status",
            Action::SearchJobs => "Failed to fetch jobs",
            Action::LoadJob => "Failed to fetch job",
            Action::LoadDashboard => "Failed to load dashboard",
            Action::LoadProfile => "Failed to fetch profile",
            Action::SaveProfile => "Failed to update profile. Please try again.",
        };
        f.write_str(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Failed(Action),

    #[error("Job not found")]
    NotFound,
}

impl ServiceError {
    /// Logs the store failure in full and keeps only the generic message.
    pub fn storage(action: Action, err: StorageError) -> ServiceError {
        tracing::error!(?action, error = %err, "storage operation failed");
        ServiceError::Failed(action)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string()
        }))
    }
}
