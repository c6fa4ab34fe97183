pub mod project_dto;
pub mod webhook_dto;
