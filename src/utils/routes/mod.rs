use actix_web::{error, web, HttpResponse};

pub mod accounts;
pub mod misc;
pub mod posts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request format: {err}");
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": message
            })),
        )
        .into()
    });

    cfg.app_data(json)
        .service(misc::health)
        .service(posts::list_jobs)
        .service(posts::create_job)
        .service(posts::get_job)
        .service(posts::update_job)
        .service(posts::delete_job)
        .service(posts::set_job_status)
        .service(accounts::dashboard)
        .service(accounts::get_profile)
        .service(accounts::update_profile);
}
