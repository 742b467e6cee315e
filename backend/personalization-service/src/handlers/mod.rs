pub mod events;
pub mod feed;
pub mod settings;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::PersonalizationService;
use actix_web::{get, web, HttpRequest, HttpResponse};
use serde_json::json;
use std::sync::Arc;

pub use events::{post_event, post_task};
pub use feed::get_feed;
pub use settings::{get_settings, put_settings};

/// Header carrying the authenticated actor id, set by the identity gateway
pub const ACTOR_HEADER: &str = "X-User-Id";

pub struct AppState {
    pub personalization: Arc<PersonalizationService>,
}

pub(crate) fn actor_id(req: &HttpRequest) -> Result<String> {
    req.headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Authentication(format!("Missing {} header", ACTOR_HEADER)))
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "personalization-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/metrics")]
pub async fn metrics_endpoint() -> Result<HttpResponse> {
    let body = metrics::render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(metrics_endpoint).service(
        web::scope("/api/v1/personalization")
            .service(get_feed)
            .service(get_settings)
            .service(put_settings)
            .service(post_task)
            .service(post_event),
    );
}
