use actix_web::{get, HttpResponse};

use crate::types::HealthResponse;

/// Liveness check
#[get("/health")]
pub async fn health() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
