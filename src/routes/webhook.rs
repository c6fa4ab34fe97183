use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{
    config::ReplayCount,
    dto::webhook_dto::{ReceiveResponse, ReplayResponse, WebhookEntryResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/hook/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    request_body(
        content = String,
        description = "Raw webhook body, stored and relayed verbatim",
        content_type = "application/octet-stream"
    ),
    responses(
        (status = 200, description = "Payload logged", body = ReceiveResponse),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn receive_hook(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    // The relay outcome is never part of this response.
    let receipt = state.ingest_service.receive(&project_id, body).await?;
    Ok(Json(ReceiveResponse {
        message: "Received".to_string(),
        entry_id: receipt.entry_id,
    }))
}

/// Unknown projects get an empty list rather than a 404.
#[utoipa::path(
    get,
    path = "/logs/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Stored payloads in arrival order", body = [WebhookEntryResponse])
    )
)]
#[axum::debug_handler]
pub async fn list_logs(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse> {
    let entries = state.log_service.list(&project_id).await?;
    let items: Vec<WebhookEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/replay/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Log replayed to the current target", body = ReplayResponse),
        (status = 404, description = "Project or target not found")
    )
)]
#[axum::debug_handler]
pub async fn replay_logs(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse> {
    let cancel = state.shutdown.child_token();
    let report = state.replay_service.replay(&project_id, &cancel).await?;
    let reported = match state.replay_count {
        ReplayCount::Attempted => report.attempted,
        ReplayCount::Delivered => report.delivered,
    };
    Ok(Json(ReplayResponse::new(report, reported)))
}
