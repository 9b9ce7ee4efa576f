//! Validation and ownership checks for every job mutation.
//!
//! Each operation validates first, then issues exactly one store call. Delete,
//! update and status changes are always scoped to `id AND owner_id`, so a
//! request for someone else's posting (or one that does not exist) simply
//! matches no rows and still reports success.

use chrono::Utc;

use crate::data::posts::{JobDetails, JobPatch, JobStore, NewJob};
use crate::data::query::ownership_scope;
use crate::utils::enums::JobType;
use crate::utils::errors::{Action, ServiceError, ValidationError};
use crate::utils::structures::{blank_to_none, JobForm};

pub fn validate_job_form(form: &JobForm) -> Result<JobDetails, ValidationError> {
    let title = blank_to_none(&form.title);
    let company = blank_to_none(&form.company);
    let location = blank_to_none(&form.location);
    let job_type = blank_to_none(&form.job_type);
    let description = blank_to_none(&form.description);

    let (Some(title), Some(company), Some(location), Some(job_type), Some(description)) =
        (title, company, location, job_type, description)
    else {
        return Err(ValidationError::MissingRequiredFields);
    };

    let job_type = JobType::parse(&job_type).ok_or(ValidationError::InvalidJobType)?;

    let salary_min = parse_salary(&form.salary_min)?;
    let salary_max = parse_salary(&form.salary_max)?;
    if let (Some(min), Some(max)) = (salary_min, salary_max) {
        if min > max {
            return Err(ValidationError::SalaryRangeInvalid);
        }
    }

    let application_email = blank_to_none(&form.application_email);
    let application_url = blank_to_none(&form.application_url);
    if application_email.is_none() && application_url.is_none() {
        return Err(ValidationError::MissingApplicationMethod);
    }
    if let Some(email) = &application_email {
        if !looks_like_email(email) {
            return Err(ValidationError::InvalidApplicationEmail);
        }
    }
    if let Some(url) = &application_url {
        if !looks_like_url(url) {
            return Err(ValidationError::InvalidApplicationUrl);
        }
    }

    Ok(JobDetails {
        title,
        company,
        location,
        job_type,
        salary_min,
        salary_max,
        description,
        requirements: blank_to_none(&form.requirements),
        benefits: blank_to_none(&form.benefits),
        application_email,
        application_url,
    })
}

/// Blank means not given. Anything else must be a whole number of at least zero.
fn parse_salary(value: &Option<String>) -> Result<Option<i64>, ValidationError> {
    match blank_to_none(value) {
        None => Ok(None),
        Some(v) => match v.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(Some(n)),
            _ => Err(ValidationError::InvalidSalary),
        },
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

fn looks_like_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Validates the form and inserts a new active posting owned by `user_id`.
/// Returns the new posting's id.
pub fn create_job<S>(store: &S, form: &JobForm, user_id: &str) -> Result<String, ServiceError>
where
    S: JobStore + ?Sized,
{
    let details = validate_job_form(form)?;
    let job = NewJob {
        details,
        owner_id: user_id.to_string(),
        is_active: true,
    };

    let id = store
        .insert_job(&job)
        .map_err(|e| ServiceError::storage(Action::CreateJob, e))?;
    tracing::info!(job_id = %id, owner_id = user_id, "job posting created");
    Ok(id)
}

pub fn update_job<S>(store: &S, job_id: &str, form: &JobForm, user_id: &str) -> Result<(), ServiceError>
where
    S: JobStore + ?Sized,
{
    let details = validate_job_form(form)?;
    let patch = JobPatch {
        details: Some(details),
        is_active: None,
        updated_at: Utc::now(),
    };

    let touched = store
        .update_jobs(&ownership_scope(job_id, user_id), &patch)
        .map_err(|e| ServiceError::storage(Action::UpdateJob, e))?;
    report_scoped("update", job_id, user_id, touched);
    Ok(())
}

pub fn delete_job<S>(store: &S, job_id: &str, user_id: &str) -> Result<(), ServiceError>
where
    S: JobStore + ?Sized,
{
    let touched = store
        .delete_jobs(&ownership_scope(job_id, user_id))
        .map_err(|e| ServiceError::storage(Action::DeleteJob, e))?;
    report_scoped("delete", job_id, user_id, touched);
    Ok(())
}

pub fn toggle_job_status<S>(store: &S, job_id: &str, user_id: &str, is_active: bool) -> Result<(), ServiceError>
where
    S: JobStore + ?Sized,
{
    let patch = JobPatch {
        details: None,
        is_active: Some(is_active),
        updated_at: Utc::now(),
    };

    let touched = store
        .update_jobs(&ownership_scope(job_id, user_id), &patch)
        .map_err(|e| ServiceError::storage(Action::ToggleStatus, e))?;
    report_scoped("status change", job_id, user_id, touched);
    Ok(())
}

// Wrong owner and unknown id look the same to the caller; only the log tells them apart.
fn report_scoped(operation: &str, job_id: &str, user_id: &str, touched: usize) {
    if touched == 0 {
        tracing::warn!(
            job_id,
            user_id,
            "{operation} matched no rows (unknown id or not the owner)"
        );
    } else {
        tracing::info!(job_id, user_id, rows = touched, "{operation} applied");
    }
}
