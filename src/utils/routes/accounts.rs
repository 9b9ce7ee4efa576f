use actix_web::{get, put, web, HttpResponse};
use chrono::Utc;

use crate::data::database::Database;
use crate::data::posts::{DashboardStats, JobStore};
use crate::data::profiles::{load_profile, save_profile, UserProfile};
use crate::data::query::owner_jobs_query;
use crate::utils::auth::AuthUser;
use crate::utils::errors::{Action, ServiceError};
use crate::utils::structures::ProfileForm;

/// The employer's own postings (active and hidden), with counts and profile.
#[get("/api/v1/dashboard")]
pub async fn dashboard(db: web::Data<Database>, user: AuthUser) -> Result<HttpResponse, ServiceError> {
    let jobs = db
        .select_jobs(&owner_jobs_query(&user.id))
        .map_err(|e| ServiceError::storage(Action::LoadDashboard, e))?
        .rows;
    let profile = load_profile(db.get_ref(), &user.id)?;
    let stats = DashboardStats::from_jobs(&jobs, Utc::now());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user,
        "display_name": UserProfile::display_name(profile.as_ref(), &user.email),
        "profile": profile,
        "stats": stats,
        "jobs": jobs
    })))
}

#[get("/api/v1/profile")]
pub async fn get_profile(db: web::Data<Database>, user: AuthUser) -> Result<HttpResponse, ServiceError> {
    let profile = load_profile(db.get_ref(), &user.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "email": user.email,
        "profile": profile
    })))
}

#[put("/api/v1/profile")]
pub async fn update_profile(
    db: web::Data<Database>,
    user: AuthUser,
    form: web::Json<ProfileForm>,
) -> Result<HttpResponse, ServiceError> {
    let profile = save_profile(db.get_ref(), &user.id, &form)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "profile": profile
    })))
}
