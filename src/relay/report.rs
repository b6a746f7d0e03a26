//! Completion channel for fire-and-log deliveries.
//!
//! Sinks never await their remote calls inline. Each delivery runs in its
//! own task and reports a [`DeliveryOutcome`] here; a single reporter task
//! turns outcomes into log lines.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::UintString;

/// Result of one forwarded order or one Mesh batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Forwarded {
        maker: String,
        salt: UintString,
    },
    ForwardFailed {
        maker: String,
        salt: UintString,
        error: String,
    },
    MeshAccepted {
        accepted: usize,
        rejected: BTreeMap<String, usize>,
        total: usize,
    },
    MeshFailed {
        total: usize,
        error: String,
    },
}

impl DeliveryOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ForwardFailed { .. } | Self::MeshFailed { .. })
    }
}

pub type OutcomeSender = mpsc::UnboundedSender<DeliveryOutcome>;
pub type OutcomeReceiver = mpsc::UnboundedReceiver<DeliveryOutcome>;

#[must_use]
pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    mpsc::unbounded_channel()
}

/// Log every outcome until all senders are gone.
pub fn spawn_reporter(mut outcomes: OutcomeReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            log_outcome(&outcome);
        }
        debug!("Delivery reporter stopped");
    })
}

fn log_outcome(outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Forwarded { maker, salt } => {
            debug!(maker = %maker, salt = %salt, "Order forwarded");
        }
        DeliveryOutcome::ForwardFailed { maker, salt, error } => {
            warn!(maker = %maker, salt = %salt, error = %error, "Order forward failed");
        }
        DeliveryOutcome::MeshAccepted {
            accepted,
            rejected,
            total,
        } => {
            let rejected_total: usize = rejected.values().sum();
            info!(
                accepted,
                rejected = rejected_total,
                total,
                "Mesh response"
            );
            if !rejected.is_empty() {
                info!(by_code = ?rejected, "Mesh rejections");
            }
        }
        DeliveryOutcome::MeshFailed { total, error } => {
            warn!(total, error = %error, "Mesh push failed");
        }
    }
}
