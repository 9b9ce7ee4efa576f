use std::collections::HashMap;

use serde::Serialize;

use crate::utils::enums::JobType;

/// Longest search or location term kept, in characters.
pub const MAX_TERM_CHARS: usize = 100;

/// Query parameters as they arrive: every key may repeat.
pub type RawParams = HashMap<String, Vec<String>>;

/// Groups `key=value` pairs by key, keeping the order values arrived in.
pub fn group_pairs<I>(pairs: I) -> RawParams
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut params = RawParams::new();
    for (key, value) in pairs {
        params.entry(key).or_default().push(value);
    }
    params
}

/// A job search request after normalization. Every field is either a usable
/// filter or absent; there is no invalid state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub search: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub page: u32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            search: None,
            job_type: None,
            location: None,
            salary_min: None,
            salary_max: None,
            page: 1,
        }
    }
}

impl FilterSpec {
    pub fn from_params(params: &RawParams) -> FilterSpec {
        FilterSpec {
            search: text(params, "search"),
            job_type: first(params, "job_type").and_then(JobType::parse),
            location: text(params, "location"),
            salary_min: non_negative(params, "salary_min"),
            salary_max: non_negative(params, "salary_max"),
            page: page(params),
        }
    }
}

fn first<'a>(params: &'a RawParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(|values| values.first())
        .map(String::as_str)
}

fn text(params: &RawParams, key: &str) -> Option<String> {
    first(params, key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            let capped: String = v.chars().take(MAX_TERM_CHARS).collect();
            capped.trim_end().to_string()
        })
}

fn non_negative(params: &RawParams, key: &str) -> Option<i64> {
    first(params, key)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n >= 0)
}

fn page(params: &RawParams) -> u32 {
    first(params, "page")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}
