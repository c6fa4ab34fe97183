pub mod forwarder;
pub mod ingest_service;
pub mod project_service;
pub mod relay_queue;
pub mod replay_service;
pub mod webhook_log_service;
