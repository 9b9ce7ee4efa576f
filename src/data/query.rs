//! Turns a [`FilterSpec`] into a plain description of the rows to fetch.
//!
//! Nothing in here talks to the database. The store receives a [`JobQuery`]
//! and decides how to execute it.

use serde::Serialize;

use crate::data::filters::FilterSpec;

pub const PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    OwnerId,
    Title,
    Company,
    Location,
    JobType,
    SalaryMin,
    SalaryMax,
    Description,
    IsActive,
    CreatedAt,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::OwnerId => "owner_id",
            Column::Title => "title",
            Column::Company => "company",
            Column::Location => "location",
            Column::JobType => "job_type",
            Column::SalaryMin => "salary_min",
            Column::SalaryMax => "salary_max",
            Column::Description => "description",
            Column::IsActive => "is_active",
            Column::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Column, Value),
    /// Case-insensitive `LIKE` against a pattern built by [`contains_pattern`].
    ILike(Column, String),
    /// `column >= value`. A NULL column does not constrain the row.
    Gte(Column, i64),
    /// `column <= value`. A NULL column does not constrain the row.
    Lte(Column, i64),
    /// Matches when any inner predicate matches.
    Any(Vec<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub column: Column,
    pub descending: bool,
}

impl Ordering {
    pub fn newest_first() -> Ordering {
        Ordering {
            column: Column::CreatedAt,
            descending: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn for_page(page: u32) -> PageWindow {
        let page = u64::from(page.max(1));
        PageWindow {
            offset: (page - 1) * u64::from(PAGE_SIZE),
            limit: u64::from(PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountRequest {
    None,
    /// Total rows matching the predicates, ignoring the window.
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    /// AND-ed together, in this order.
    pub predicates: Vec<Predicate>,
    pub order: Ordering,
    pub window: Option<PageWindow>,
    pub count: CountRequest,
}

/// `%term%`, with LIKE wildcards in the term escaped by a backslash.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// The public job search: active postings only, newest first, one page.
pub fn search_query(spec: &FilterSpec) -> JobQuery {
    let mut predicates = vec![Predicate::Eq(Column::IsActive, Value::Bool(true))];

    if let Some(search) = &spec.search {
        let pattern = contains_pattern(search);
        predicates.push(Predicate::Any(vec![
            Predicate::ILike(Column::Title, pattern.clone()),
            Predicate::ILike(Column::Company, pattern.clone()),
            Predicate::ILike(Column::Description, pattern),
        ]));
    }

    if let Some(job_type) = spec.job_type {
        predicates.push(Predicate::Eq(
            Column::JobType,
            Value::Text(job_type.as_str().to_string()),
        ));
    }

    if let Some(location) = &spec.location {
        predicates.push(Predicate::ILike(Column::Location, contains_pattern(location)));
    }

    // A posting qualifies when its range reaches the seeker's floor and
    // does not start above the seeker's ceiling.
    if let Some(min) = spec.salary_min {
        predicates.push(Predicate::Gte(Column::SalaryMax, min));
    }
    if let Some(max) = spec.salary_max {
        predicates.push(Predicate::Lte(Column::SalaryMin, max));
    }

    JobQuery {
        predicates,
        order: Ordering::newest_first(),
        window: Some(PageWindow::for_page(spec.page)),
        count: CountRequest::Exact,
    }
}

/// Every posting owned by `owner_id`, active or not.
pub fn owner_jobs_query(owner_id: &str) -> JobQuery {
    JobQuery {
        predicates: vec![Predicate::Eq(
            Column::OwnerId,
            Value::Text(owner_id.to_string()),
        )],
        order: Ordering::newest_first(),
        window: None,
        count: CountRequest::None,
    }
}

pub fn job_detail_query(job_id: &str) -> JobQuery {
    JobQuery {
        predicates: vec![
            Predicate::Eq(Column::Id, Value::Text(job_id.to_string())),
            Predicate::Eq(Column::IsActive, Value::Bool(true)),
        ],
        order: Ordering::newest_first(),
        window: Some(PageWindow { offset: 0, limit: 1 }),
        count: CountRequest::None,
    }
}

/// Restricts a mutation to one row that must also belong to `owner_id`.
pub fn ownership_scope(job_id: &str, owner_id: &str) -> Vec<Predicate> {
    vec![
        Predicate::Eq(Column::Id, Value::Text(job_id.to_string())),
        Predicate::Eq(Column::OwnerId, Value::Text(owner_id.to_string())),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(page: u32, total: u64) -> Pagination {
        let page = page.max(1);
        let total_pages = total.div_ceil(u64::from(PAGE_SIZE)).max(1);
        Pagination {
            page,
            page_size: PAGE_SIZE,
            total,
            total_pages,
            has_next: u64::from(page) < total_pages,
            has_previous: page > 1,
        }
    }
}
