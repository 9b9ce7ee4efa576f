use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::data::database::Database;
use crate::data::filters::{group_pairs, FilterSpec};
use crate::data::guard;
use crate::data::posts::JobStore;
use crate::data::query::{job_detail_query, search_query, Pagination};
use crate::utils::auth::AuthUser;
use crate::utils::errors::{Action, ServiceError};
use crate::utils::structures::{JobForm, StatusRequest};

#[get("/api/v1/jobs")]
pub async fn list_jobs(
    db: web::Data<Database>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, ServiceError> {
    let spec = FilterSpec::from_params(&group_pairs(query.into_inner()));
    let result = db
        .select_jobs(&search_query(&spec))
        .map_err(|e| ServiceError::storage(Action::SearchJobs, e))?;
    let pagination = Pagination::new(spec.page, result.total.unwrap_or(0));

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "filters": spec,
        "jobs": result.rows,
        "pagination": pagination
    })))
}

#[get("/api/v1/jobs/{id}")]
pub async fn get_job(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    let job = db
        .select_jobs(&job_detail_query(&id))
        .map_err(|e| ServiceError::storage(Action::LoadJob, e))?
        .rows
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "job": job
    })))
}

#[post("/api/v1/jobs")]
pub async fn create_job(
    db: web::Data<Database>,
    user: AuthUser,
    form: web::Json<JobForm>,
) -> Result<HttpResponse, ServiceError> {
    let id = guard::create_job(db.get_ref(), &form, &user.id)?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "id": id
    })))
}

#[put("/api/v1/jobs/{id}")]
pub async fn update_job(
    db: web::Data<Database>,
    user: AuthUser,
    path: web::Path<String>,
    form: web::Json<JobForm>,
) -> Result<HttpResponse, ServiceError> {
    guard::update_job(db.get_ref(), &path, &form, &user.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[delete("/api/v1/jobs/{id}")]
pub async fn delete_job(
    db: web::Data<Database>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    guard::delete_job(db.get_ref(), &path, &user.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[put("/api/v1/jobs/{id}/status")]
pub async fn set_job_status(
    db: web::Data<Database>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    guard::toggle_job_status(db.get_ref(), &path, &user.id, body.is_active)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::utils::auth::testing::issue_token;
    use crate::utils::routes::testing::{app_state, SECRET};

    fn job_payload(title: &str) -> Value {
        json!({
            "title": title,
            "company": "Acme Inc",
            "location": "Remote",
            "job_type": "full-time",
            "description": "Build great UIs",
            "application_email": "hr@acme.test",
            "salary_min": "80000",
            "salary_max": "120000"
        })
    }

    #[actix_web::test]
    async fn create_requires_a_token() {
        let (_dir, db, settings) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(settings)
                .configure(crate::utils::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/jobs")
            .set_json(job_payload("Engineer"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_search_and_paginate() {
        let (_dir, db, settings) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(settings)
                .configure(crate::utils::routes::configure),
        )
        .await;
        let token = issue_token(SECRET, "user-1", "hr@acme.test", 300);

        for i in 0..12 {
            let req = test::TestRequest::post()
                .uri("/api/v1/jobs")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(job_payload(&format!("Engineer {i}")))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["success"], true);
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/jobs?search=engineer&job_type=full-time&page=3&page=1&salary_min=abc")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pagination"]["total"], 12);
        assert_eq!(body["pagination"]["total_pages"], 3);
        assert_eq!(body["pagination"]["page"], 3);
        assert_eq!(body["pagination"]["has_next"], false);
        assert_eq!(body["filters"]["salary_min"], Value::Null);
        assert_eq!(body["jobs"].as_array().unwrap().len(), 2);
        assert_eq!(body["jobs"][0]["title"], "Engineer 1");
    }

    #[actix_web::test]
    async fn validation_errors_come_back_as_json() {
        let (_dir, db, settings) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(settings)
                .configure(crate::utils::routes::configure),
        )
        .await;
        let token = issue_token(SECRET, "user-1", "hr@acme.test", 300);

        let mut payload = job_payload("Engineer");
        payload["job_type"] = json!("bogus");
        let req = test::TestRequest::post()
            .uri("/api/v1/jobs")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "success": false, "error": "Invalid job type selected" })
        );
    }

    #[actix_web::test]
    async fn only_the_owner_can_hide_or_delete() {
        let (_dir, db, settings) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(settings)
                .configure(crate::utils::routes::configure),
        )
        .await;
        let owner = issue_token(SECRET, "owner", "owner@acme.test", 300);
        let intruder = issue_token(SECRET, "intruder", "x@evil.test", 300);

        let req = test::TestRequest::post()
            .uri("/api/v1/jobs")
            .insert_header(("Authorization", format!("Bearer {owner}")))
            .set_json(job_payload("Engineer"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["id"].as_str().unwrap().to_string();

        // Someone else: reported as success, nothing changes.
        for req in [
            test::TestRequest::put()
                .uri(&format!("/api/v1/jobs/{id}/status"))
                .insert_header(("Authorization", format!("Bearer {intruder}")))
                .set_json(json!({ "is_active": false }))
                .to_request(),
            test::TestRequest::delete()
                .uri(&format!("/api/v1/jobs/{id}"))
                .insert_header(("Authorization", format!("Bearer {intruder}")))
                .to_request(),
        ] {
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body, json!({ "success": true }));
        }
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/jobs/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // The owner hides it; the public detail view stops finding it.
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/jobs/{id}/status"))
            .insert_header(("Authorization", format!("Bearer {owner}")))
            .set_json(json!({ "is_active": false }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/jobs/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn only_the_owner_can_edit() {
        let (_dir, db, settings) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(settings)
                .configure(crate::utils::routes::configure),
        )
        .await;
        let owner = issue_token(SECRET, "owner", "owner@acme.test", 300);
        let intruder = issue_token(SECRET, "intruder", "x@evil.test", 300);

        let req = test::TestRequest::post()
            .uri("/api/v1/jobs")
            .insert_header(("Authorization", format!("Bearer {owner}")))
            .set_json(job_payload("Engineer"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/jobs/{id}"))
            .insert_header(("Authorization", format!("Bearer {intruder}")))
            .set_json(job_payload("Hijacked"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/jobs/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["job"]["title"], "Engineer");

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/jobs/{id}"))
            .insert_header(("Authorization", format!("Bearer {owner}")))
            .set_json(job_payload("Senior Engineer"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/jobs/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["job"]["title"], "Senior Engineer");
    }

    #[actix_web::test]
    async fn negative_salary_is_a_validation_error() {
        let (_dir, db, settings) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(settings)
                .configure(crate::utils::routes::configure),
        )
        .await;
        let token = issue_token(SECRET, "owner", "owner@acme.test", 300);

        let mut payload = job_payload("Engineer");
        payload["salary_min"] = json!("-1");
        let req = test::TestRequest::post()
            .uri("/api/v1/jobs")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "success": false, "error": "Salary must be a whole, non-negative number" })
        );
    }
}
