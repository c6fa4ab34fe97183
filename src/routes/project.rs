use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::project_dto::{
        MessageResponse, ProjectResponse, RegisterRequest, RegisterResponse, SetTargetRequest,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Project registered", body = RegisterResponse),
        (status = 400, description = "Project already exists or invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn register_project(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.project_service.register(&payload.project_id).await?;
    Ok(Json(RegisterResponse {
        message: "Registered".to_string(),
        project_id: payload.project_id,
    }))
}

#[utoipa::path(
    post,
    path = "/set-target/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    request_body = SetTargetRequest,
    responses(
        (status = 200, description = "Target updated", body = MessageResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn set_target(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<SetTargetRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .project_service
        .set_target(&project_id, &payload.target_url)
        .await?;
    Ok(Json(MessageResponse {
        message: "Target URL updated.".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/projects/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse> {
    let project = state.project_service.get(&project_id).await?;
    Ok(Json(ProjectResponse::from(project)))
}
