//! Best-effort background relay for freshly received webhooks.
//!
//! Ingestion hands jobs to an unbounded channel and returns immediately.
//! One worker task drains the channel and runs each delivery on its own
//! task, at most `concurrency` at a time. Outcomes are logged and dropped;
//! nothing is retried.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::MAX_RELAY_CONCURRENCY;
use crate::services::forwarder::{DeliveryResult, Forwarder};

#[derive(Debug, Clone)]
pub struct RelayJob {
    pub project_id: String,
    pub entry_id: i64,
    pub target_url: String,
    pub payload: Bytes,
}

#[derive(Clone)]
pub struct RelayQueue {
    tx: mpsc::UnboundedSender<RelayJob>,
}

impl RelayQueue {
    /// Starts the worker. It stops when `shutdown` is cancelled or every
    /// `RelayQueue` handle has been dropped.
    ///
    /// `concurrency` is clamped to `1..=MAX_RELAY_CONCURRENCY`.
    pub fn spawn(
        forwarder: Forwarder,
        concurrency: u32,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let concurrency = concurrency.clamp(1, MAX_RELAY_CONCURRENCY);
        let handle = tokio::spawn(run_worker(rx, forwarder, concurrency, shutdown));
        (Self { tx }, handle)
    }

    /// Queues a forward. Never blocks and never fails the caller.
    pub fn submit(&self, job: RelayJob) {
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            tracing::warn!(
                project_id = %job.project_id,
                entry_id = job.entry_id,
                "Relay worker is not running, forward dropped"
            );
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<RelayJob>,
    forwarder: Forwarder,
    concurrency: u32,
    shutdown: CancellationToken,
) {
    let permits = Arc::new(Semaphore::new(concurrency as usize));
    let mut dropped = 0usize;

    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let permit = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                dropped += 1;
                break;
            }
            permit = permits.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let forwarder = forwarder.clone();
        tokio::spawn(async move {
            let _permit = permit;
            relay_one(&forwarder, job).await;
        });
    }

    rx.close();
    while rx.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        tracing::warn!(dropped, "Relay worker stopped with forwards still queued");
    }

    // In-flight deliveries are bounded by the client timeout.
    let _ = permits.acquire_many(concurrency).await;
    tracing::info!("Relay worker stopped");
}

async fn relay_one(forwarder: &Forwarder, job: RelayJob) {
    match forwarder.deliver(&job.target_url, job.payload).await {
        DeliveryResult::Delivered { status } => tracing::info!(
            project_id = %job.project_id,
            entry_id = job.entry_id,
            target = %job.target_url,
            status,
            "Relayed webhook"
        ),
        DeliveryResult::Failed(failure) => tracing::warn!(
            project_id = %job.project_id,
            entry_id = job.entry_id,
            target = %job.target_url,
            error = %failure,
            "Relay failed, not retried"
        ),
    }
}
