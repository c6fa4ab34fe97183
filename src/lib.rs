pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ReplayCount};
use crate::database::WebhookStore;
use crate::error::Result;
use crate::services::{
    forwarder::Forwarder, ingest_service::IngestService, project_service::ProjectService,
    relay_queue::RelayQueue, replay_service::ReplayService,
    webhook_log_service::WebhookLogService,
};

#[derive(Clone)]
pub struct AppState {
    pub project_service: ProjectService,
    pub log_service: WebhookLogService,
    pub ingest_service: IngestService,
    pub replay_service: ReplayService,
    pub replay_count: ReplayCount,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        store: Arc<dyn WebhookStore>,
        forwarder: Forwarder,
        relay: RelayQueue,
        config: &Config,
        shutdown: CancellationToken,
    ) -> Self {
        let project_service = ProjectService::new(store.clone())
            .with_target_validation(config.validate_target_urls);
        let log_service = WebhookLogService::new(store);
        let ingest_service =
            IngestService::new(project_service.clone(), log_service.clone(), relay);
        let replay_service =
            ReplayService::new(project_service.clone(), log_service.clone(), forwarder);

        Self {
            project_service,
            log_service,
            ingest_service,
            replay_service,
            replay_count: config.replay_count,
            shutdown,
        }
    }

    /// Builds the forwarder, starts the relay worker and wires the services.
    ///
    /// The worker stops when `shutdown` is cancelled; await the returned
    /// handle to let in-flight forwards finish.
    pub fn start(
        store: Arc<dyn WebhookStore>,
        config: &Config,
        shutdown: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>)> {
        let forwarder = Forwarder::new(config.forward_timeout)?;
        let (relay, worker) =
            RelayQueue::spawn(forwarder.clone(), config.relay_concurrency, shutdown.clone());
        let state = Self::new(store, forwarder, relay, config, shutdown);
        Ok((state, worker))
    }
}
