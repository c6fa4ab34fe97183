pub mod project;
pub mod webhook_log;
