//! Order sinks: where routed orders end up.
//!
//! Exactly one sink is active per run. The Mesh sink lives in
//! [`super::batch`] because it owns the pending batch and flush timer.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::report::{DeliveryOutcome, OutcomeSender};
use crate::domain::SignedOrder;
use crate::port::OrderSubmitter;
use crate::retry::{self, RetryPolicy};

/// Destination for routed orders.
///
/// `accept` must not block on the network; remote deliveries are spawned
/// and report through the completion channel.
pub trait OrderSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn accept(&self, orders: Vec<SignedOrder>);
}

/// Prints one JSON document per line.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl OrderSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn accept(&self, orders: Vec<SignedOrder>) {
        let mut out = self.out.lock();
        for order in &orders {
            let line = match serde_json::to_string(order) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize order");
                    continue;
                }
            };
            if let Err(e) = writeln!(out, "{line}") {
                warn!(error = %e, "Failed to write order");
            }
        }
        if let Err(e) = out.flush() {
            warn!(error = %e, "Failed to flush output");
        }
    }
}

/// Re-submits every order to another relayer, one task per order.
pub struct SraForwardSink {
    submitter: Arc<dyn OrderSubmitter>,
    policy: RetryPolicy,
    outcomes: OutcomeSender,
}

impl SraForwardSink {
    pub fn new(submitter: Arc<dyn OrderSubmitter>, policy: RetryPolicy, outcomes: OutcomeSender) -> Self {
        Self {
            submitter,
            policy,
            outcomes,
        }
    }
}

impl OrderSink for SraForwardSink {
    fn name(&self) -> &'static str {
        "sra"
    }

    fn accept(&self, orders: Vec<SignedOrder>) {
        debug!(count = orders.len(), "Forwarding orders to relayer");
        for order in orders {
            let submitter = Arc::clone(&self.submitter);
            let outcomes = self.outcomes.clone();
            let policy = self.policy;

            tokio::spawn(async move {
                let result =
                    retry::attempt(&policy, "submit_order", || submitter.submit_order(&order)).await;

                let outcome = match result {
                    Ok(()) => DeliveryOutcome::Forwarded {
                        maker: order.maker_address,
                        salt: order.salt,
                    },
                    Err(e) => DeliveryOutcome::ForwardFailed {
                        maker: order.maker_address,
                        salt: order.salt,
                        error: e.to_string(),
                    },
                };
                let _ = outcomes.send(outcome);
            });
        }
    }
}
