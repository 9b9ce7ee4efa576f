use serde::Deserialize;

/// A job form as submitted. Nothing is trusted yet; see `guard::validate_job_form`.
///
/// Salaries arrive as text. Blank means not given; any other value must be a
/// whole, non-negative number or the form is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobForm {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub application_email: Option<String>,
    pub application_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub is_active: bool,
}

/// Trimmed value, or `None` when missing or blank.
pub fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
