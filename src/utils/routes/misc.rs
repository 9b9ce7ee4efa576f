use actix_web::{get, HttpResponse, Responder};

#[get("/api/v1/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "ok"
    }))
}
