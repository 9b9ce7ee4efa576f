use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::data::query::{JobQuery, Predicate};
use crate::utils::enums::JobType;
use crate::utils::errors::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: String,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub application_email: Option<String>,
    pub application_url: Option<String>,
    pub is_active: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable part of a posting, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDetails {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: String,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub application_email: Option<String>,
    pub application_url: Option<String>,
}

/// A posting ready to insert. The store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub details: JobDetails,
    pub owner_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobPatch {
    pub details: Option<JobDetails>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectResult {
    pub rows: Vec<JobPosting>,
    /// Present when the query asked for a count.
    pub total: Option<u64>,
}

/// Row-level CRUD over the `jobs` table.
///
/// `update_jobs` and `delete_jobs` return the number of rows they touched;
/// touching none is not an error.
pub trait JobStore {
    fn insert_job(&self, job: &NewJob) -> Result<String, StorageError>;
    fn select_jobs(&self, query: &JobQuery) -> Result<SelectResult, StorageError>;
    fn update_jobs(&self, filters: &[Predicate], patch: &JobPatch) -> Result<usize, StorageError>;
    fn delete_jobs(&self, filters: &[Predicate]) -> Result<usize, StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub inactive_jobs: usize,
    pub jobs_this_month: usize,
}

impl DashboardStats {
    pub fn from_jobs(jobs: &[JobPosting], now: DateTime<Utc>) -> DashboardStats {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);

        let active_jobs = jobs.iter().filter(|job| job.is_active).count();
        DashboardStats {
            total_jobs: jobs.len(),
            active_jobs,
            inactive_jobs: jobs.len() - active_jobs,
            jobs_this_month: jobs
                .iter()
                .filter(|job| job.created_at >= month_start)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(is_active: bool, created_at: DateTime<Utc>) -> JobPosting {
        JobPosting {
            id: "id".to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            salary_min: None,
            salary_max: None,
            description: "Build things".to_string(),
            requirements: None,
            benefits: None,
            application_email: Some("hr@acme.test".to_string()),
            application_url: None,
            is_active,
            owner_id: "owner".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn stats_split_active_and_this_month() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let jobs = vec![
            posting(true, Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()),
            posting(false, Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()),
            posting(true, Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap()),
        ];

        let stats = DashboardStats::from_jobs(&jobs, now);
        assert_eq!(
            stats,
            DashboardStats {
                total_jobs: 3,
                active_jobs: 2,
                inactive_jobs: 1,
                jobs_this_month: 2,
            }
        );
    }

    #[test]
    fn stats_for_no_jobs_are_zero() {
        let stats = DashboardStats::from_jobs(&[], Utc::now());
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.jobs_this_month, 0);
    }
}
