use axum::Json;
use utoipa::OpenApi;

use crate::dto::{
    project_dto::{
        MessageResponse, ProjectResponse, RegisterRequest, RegisterResponse, SetTargetRequest,
    },
    webhook_dto::{ReceiveResponse, ReplayResponse, WebhookEntryResponse},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::project::register_project,
        crate::routes::project::set_target,
        crate::routes::project::get_project,
        crate::routes::webhook::receive_hook,
        crate::routes::webhook::list_logs,
        crate::routes::webhook::replay_logs,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        SetTargetRequest,
        MessageResponse,
        ProjectResponse,
        ReceiveResponse,
        WebhookEntryResponse,
        ReplayResponse,
    )),
    info(title = "hook-relay", description = "Webhook log, relay and replay")
)]
pub struct ApiDoc;

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
