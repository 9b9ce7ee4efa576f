use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::data::posts::{JobPatch, JobPosting, JobStore, NewJob, SelectResult};
use crate::data::profiles::{ProfileStore, UserProfile};
use crate::data::query::{CountRequest, JobQuery, Predicate, Value};
use crate::utils::enums::JobType;
use crate::utils::errors::{StorageError, ValidationError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT NOT NULL,
    job_type TEXT NOT NULL CHECK (job_type IN ('full-time', 'part-time', 'contract', 'internship')),
    salary_min INTEGER CHECK (salary_min IS NULL OR salary_min >= 0),
    salary_max INTEGER CHECK (salary_max IS NULL OR salary_max >= 0),
    description TEXT NOT NULL,
    requirements TEXT,
    benefits TEXT,
    application_email TEXT,
    application_url TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    owner_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS jobs_active_created ON jobs (is_active, created_at);
CREATE INDEX IF NOT EXISTS jobs_owner ON jobs (owner_id);

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    full_name TEXT,
    company TEXT,
    bio TEXT,
    website TEXT,
    updated_at TEXT NOT NULL
);
";

const JOB_COLUMNS: &str = "id, title, company, location, job_type, salary_min, salary_max, \
    description, requirements, benefits, application_email, application_url, is_active, \
    owner_id, created_at, updated_at";

/// SQLite-backed row store. A connection is opened per operation.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Database {
        Database {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path)?;
        // Built-in LIKE only folds ASCII letters.
        conn.create_scalar_function(
            "unicode_lower",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;
        Ok(conn)
    }

    pub fn migrate(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(path = %self.path.display(), "database schema ready");
        Ok(())
    }
}

// Fixed width so that text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn read_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn job_from_row(row: &Row) -> rusqlite::Result<JobPosting> {
    let job_type: String = row.get(4)?;
    let job_type = JobType::parse(&job_type)
        .ok_or_else(|| conversion_error(4, ValidationError::InvalidJobType))?;

    Ok(JobPosting {
        id: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        location: row.get(3)?,
        job_type,
        salary_min: row.get(5)?,
        salary_max: row.get(6)?,
        description: row.get(7)?,
        requirements: row.get(8)?,
        benefits: row.get(9)?,
        application_email: row.get(10)?,
        application_url: row.get(11)?,
        is_active: row.get(12)?,
        owner_id: row.get(13)?,
        created_at: read_timestamp(row, 14)?,
        updated_at: read_timestamp(row, 15)?,
    })
}

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn render_predicate(predicate: &Predicate, args: &mut Vec<SqlValue>) -> String {
    match predicate {
        Predicate::Eq(column, value) => {
            args.push(sql_value(value));
            format!("{} = ?", column.as_str())
        }
        Predicate::ILike(column, pattern) => {
            args.push(SqlValue::Text(pattern.clone()));
            format!(
                "unicode_lower({}) LIKE unicode_lower(?) ESCAPE '\\'",
                column.as_str()
            )
        }
        Predicate::Gte(column, bound) => {
            args.push(SqlValue::Integer(*bound));
            format!("({0} IS NULL OR {0} >= ?)", column.as_str())
        }
        Predicate::Lte(column, bound) => {
            args.push(SqlValue::Integer(*bound));
            format!("({0} IS NULL OR {0} <= ?)", column.as_str())
        }
        Predicate::Any(inner) if inner.is_empty() => "0".to_string(),
        Predicate::Any(inner) => {
            let parts: Vec<String> = inner.iter().map(|p| render_predicate(p, args)).collect();
            format!("({})", parts.join(" OR "))
        }
    }
}

/// ` WHERE a AND b ...` (or nothing) plus the bound arguments in order.
fn render_where(predicates: &[Predicate]) -> (String, Vec<SqlValue>) {
    let mut args = Vec::new();
    if predicates.is_empty() {
        return (String::new(), args);
    }
    let parts: Vec<String> = predicates
        .iter()
        .map(|p| render_predicate(p, &mut args))
        .collect();
    (format!(" WHERE {}", parts.join(" AND ")), args)
}

impl JobStore for Database {
    fn insert_job(&self, job: &NewJob) -> Result<String, StorageError> {
        let conn = self.connect()?;
        let id = Uuid::new_v4().to_string();
        let now = timestamp(Utc::now());
        let d = &job.details;

        conn.execute(
            &format!(
                "INSERT INTO jobs ({JOB_COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                id,
                d.title,
                d.company,
                d.location,
                d.job_type.as_str(),
                d.salary_min,
                d.salary_max,
                d.description,
                d.requirements,
                d.benefits,
                d.application_email,
                d.application_url,
                job.is_active,
                job.owner_id,
                now,
                now
            ],
        )?;
        Ok(id)
    }

    fn select_jobs(&self, query: &JobQuery) -> Result<SelectResult, StorageError> {
        let conn = self.connect()?;
        let (where_sql, args) = render_where(&query.predicates);

        let total = match query.count {
            CountRequest::Exact => {
                let sql = format!("SELECT COUNT(*) FROM jobs{where_sql}");
                let count: i64 = conn.query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
                Some(u64::try_from(count).unwrap_or(0))
            }
            CountRequest::None => None,
        };

        // rowid breaks ties between postings created in the same instant.
        let direction = if query.order.descending { "DESC" } else { "ASC" };
        let mut sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs{where_sql} ORDER BY {col} {direction}, rowid {direction}",
            col = query.order.column.as_str(),
        );
        let mut args = args;
        if let Some(window) = query.window {
            sql.push_str(" LIMIT ? OFFSET ?");
            args.push(SqlValue::Integer(i64::try_from(window.limit).unwrap_or(i64::MAX)));
            args.push(SqlValue::Integer(i64::try_from(window.offset).unwrap_or(i64::MAX)));
        }
        tracing::debug!(%sql, "selecting jobs");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), job_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(SelectResult { rows, total })
    }

    fn update_jobs(&self, filters: &[Predicate], patch: &JobPatch) -> Result<usize, StorageError> {
        if filters.is_empty() {
            return Err(StorageError::UnscopedMutation("update"));
        }
        let conn = self.connect()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();
        let text = |v: &str| SqlValue::Text(v.to_string());
        let optional_text = |v: &Option<String>| v.clone().map(SqlValue::Text).unwrap_or(SqlValue::Null);
        let optional_int = |v: Option<i64>| v.map(SqlValue::Integer).unwrap_or(SqlValue::Null);

        if let Some(d) = &patch.details {
            sets.extend([
                "title = ?",
                "company = ?",
                "location = ?",
                "job_type = ?",
                "salary_min = ?",
                "salary_max = ?",
                "description = ?",
                "requirements = ?",
                "benefits = ?",
                "application_email = ?",
                "application_url = ?",
            ]);
            args.extend([
                text(&d.title),
                text(&d.company),
                text(&d.location),
                text(d.job_type.as_str()),
                optional_int(d.salary_min),
                optional_int(d.salary_max),
                text(&d.description),
                optional_text(&d.requirements),
                optional_text(&d.benefits),
                optional_text(&d.application_email),
                optional_text(&d.application_url),
            ]);
        }
        if let Some(is_active) = patch.is_active {
            sets.push("is_active = ?");
            args.push(SqlValue::Integer(i64::from(is_active)));
        }
        sets.push("updated_at = ?");
        args.push(SqlValue::Text(timestamp(patch.updated_at)));

        let (where_sql, where_args) = render_where(filters);
        args.extend(where_args);

        let sql = format!("UPDATE jobs SET {}{where_sql}", sets.join(", "));
        Ok(conn.execute(&sql, params_from_iter(args.iter()))?)
    }

    fn delete_jobs(&self, filters: &[Predicate]) -> Result<usize, StorageError> {
        if filters.is_empty() {
            return Err(StorageError::UnscopedMutation("delete"));
        }
        let conn = self.connect()?;
        let (where_sql, args) = render_where(filters);
        Ok(conn.execute(
            &format!("DELETE FROM jobs{where_sql}"),
            params_from_iter(args.iter()),
        )?)
    }
}

impl ProfileStore for Database {
    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError> {
        let conn = self.connect()?;
        let profile = conn
            .query_row(
                "SELECT id, full_name, company, bio, website, updated_at FROM profiles WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        full_name: row.get(1)?,
                        company: row.get(2)?,
                        bio: row.get(3)?,
                        website: row.get(4)?,
                        updated_at: read_timestamp(row, 5)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO profiles (id, full_name, company, bio, website, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                company = excluded.company,
                bio = excluded.bio,
                website = excluded.website,
                updated_at = excluded.updated_at",
            params![
                profile.id,
                profile.full_name,
                profile.company,
                profile.bio,
                profile.website,
                timestamp(profile.updated_at)
            ],
        )?;
        Ok(())
    }
}
