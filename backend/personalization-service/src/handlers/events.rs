use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{actor_id, AppState};
use crate::error::{AppError, Result};
use crate::models::{ContentFamily, InteractionEvent, InteractionKind};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub family: ContentFamily,
    pub item_id: String,
    pub position: u32,
    pub kind: InteractionKind,
}

#[derive(Debug, Deserialize)]
pub struct PendingTaskRequest {
    pub task: String,
    pub pending: bool,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    /// false when collection is switched off for the actor
    pub recorded: bool,
}

#[post("/events")]
pub async fn post_event(
    http_req: HttpRequest,
    body: web::Json<InteractionRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor_id = actor_id(&http_req)?;
    let request = body.into_inner();

    if request.item_id.trim().is_empty() {
        return Err(AppError::BadRequest("itemId must not be empty".to_string()));
    }

    let event = InteractionEvent {
        family: request.family,
        item_id: request.item_id,
        position: request.position,
        kind: request.kind,
        at: Utc::now(),
    };

    let recorded = state
        .personalization
        .lifecycle()
        .record_interaction(&actor_id, &event)
        .await?;

    Ok(HttpResponse::Accepted().json(WriteResponse { recorded }))
}

#[post("/signals/tasks")]
pub async fn post_task(
    http_req: HttpRequest,
    body: web::Json<PendingTaskRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor_id = actor_id(&http_req)?;
    let task = body.task.trim();

    if task.is_empty() {
        return Err(AppError::BadRequest("task must not be empty".to_string()));
    }

    let recorded = state
        .personalization
        .lifecycle()
        .set_pending_task(&actor_id, task, body.pending)
        .await?;

    Ok(HttpResponse::Accepted().json(WriteResponse { recorded }))
}
