use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;

use crate::error::Result;

/// Why a delivery attempt did not succeed. Observed internally only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailure {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("target responded with status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered { status: u16 },
    Failed(DeliveryFailure),
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryResult::Delivered { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            DeliveryResult::Delivered { status } => Some(*status),
            DeliveryResult::Failed(DeliveryFailure::Status(status)) => Some(*status),
            DeliveryResult::Failed(_) => None,
        }
    }
}

/// Sends one payload to one target. Attempts once, reports, never errors.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hook-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub async fn deliver(&self, target_url: &str, payload: Bytes) -> DeliveryResult {
        match self.client.post(target_url).body(payload).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    DeliveryResult::Delivered {
                        status: status.as_u16(),
                    }
                } else {
                    DeliveryResult::Failed(DeliveryFailure::Status(status.as_u16()))
                }
            }
            Err(err) if err.is_timeout() => DeliveryResult::Failed(DeliveryFailure::Timeout),
            Err(err) => DeliveryResult::Failed(DeliveryFailure::Transport(err.to_string())),
        }
    }
}
