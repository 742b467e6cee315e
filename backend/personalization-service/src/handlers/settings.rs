use actix_web::{get, put, web, HttpRequest, HttpResponse};
use serde::Serialize;

use super::{actor_id, AppState};
use crate::error::Result;
use crate::lifecycle::SettingsChange;
use crate::models::PersonalizationSettings;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: PersonalizationSettings,
    pub change: SettingsChange,
}

#[get("/settings")]
pub async fn get_settings(
    http_req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor_id = actor_id(&http_req)?;
    let settings = state
        .personalization
        .lifecycle()
        .settings(&actor_id)
        .await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[put("/settings")]
pub async fn put_settings(
    http_req: HttpRequest,
    body: web::Json<PersonalizationSettings>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor_id = actor_id(&http_req)?;
    let lifecycle = state.personalization.lifecycle();

    let change = lifecycle.update_settings(&actor_id, body.into_inner()).await?;
    // Read back: an inert update leaves the stored record as it was
    let settings = lifecycle.settings(&actor_id).await?;

    Ok(HttpResponse::Ok().json(SettingsResponse { settings, change }))
}
