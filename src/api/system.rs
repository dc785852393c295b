use crate::{config::Config, error::AppError, metrics::Metrics};
use actix_web::{HttpResponse, web};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;

/// Liveness only; the database is not touched.
pub async fn health(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": config.app_version(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn metrics(metrics: web::Data<Metrics>) -> Result<HttpResponse, AppError> {
    let body = metrics.render()?;
    Ok(HttpResponse::Ok()
        .content_type(TextEncoder::new().format_type())
        .body(body))
}
