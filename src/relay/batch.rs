//! Mesh batch sink.
//!
//! With a push delay, incoming orders accumulate in a [`PendingBatch`] and a
//! single timer task takes them every interval, pushing each taken batch in
//! its own task. Without one, every routed batch is pushed straight away in
//! its own task.
//!
//! The pending batch is the only state shared between producers and the
//! timer. Flushing swaps it for an empty vector under one lock acquisition,
//! so an order is either in the batch being flushed or left for the next
//! tick, never both and never neither.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::report::{DeliveryOutcome, OutcomeSender};
use super::sink::OrderSink;
use crate::domain::SignedOrder;
use crate::port::MeshRpc;
use crate::retry::{self, RetryPolicy};

/// Orders waiting for the next Mesh flush.
#[derive(Debug, Default)]
pub struct PendingBatch {
    orders: Mutex<Vec<SignedOrder>>,
}

impl PendingBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, orders: Vec<SignedOrder>) {
        self.orders.lock().extend(orders);
    }

    /// Swap the pending orders out, leaving an empty batch behind.
    #[must_use]
    pub fn take(&self) -> Vec<SignedOrder> {
        std::mem::take(&mut *self.orders.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.lock().is_empty()
    }
}

struct Flusher {
    rpc: Arc<dyn MeshRpc>,
    policy: RetryPolicy,
    pending: PendingBatch,
    outcomes: OutcomeSender,
}

impl Flusher {
    async fn flush(&self) -> usize {
        let orders = self.pending.take();
        if orders.is_empty() {
            return 0;
        }
        let total = orders.len();
        self.push(orders).await;
        total
    }

    async fn push(&self, orders: Vec<SignedOrder>) {
        let total = orders.len();
        debug!(total, "Mesh push");

        let result = retry::attempt(&self.policy, "mesh_addOrders", || {
            self.rpc.add_orders(&orders)
        })
        .await;

        let outcome = match result {
            Ok(results) => DeliveryOutcome::MeshAccepted {
                accepted: results.accepted.len(),
                rejected: results.rejected_by_code(),
                total,
            },
            Err(e) => DeliveryOutcome::MeshFailed {
                total,
                error: e.to_string(),
            },
        };
        let _ = self.outcomes.send(outcome);
    }
}

/// Sink that batches orders into `mesh_addOrders` calls.
pub struct MeshBatcher {
    flusher: Arc<Flusher>,
    push_delay: Option<Duration>,
    ticker: OnceLock<JoinHandle<()>>,
}

impl MeshBatcher {
    pub fn new(
        rpc: Arc<dyn MeshRpc>,
        policy: RetryPolicy,
        push_delay: Option<Duration>,
        outcomes: OutcomeSender,
    ) -> Self {
        Self {
            flusher: Arc::new(Flusher {
                rpc,
                policy,
                pending: PendingBatch::new(),
                outcomes,
            }),
            push_delay,
            ticker: OnceLock::new(),
        }
    }

    /// Number of orders waiting for the next tick.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.flusher.pending.len()
    }

    /// Flush now instead of waiting for the timer. Returns how many orders were pushed.
    pub async fn flush(&self) -> usize {
        self.flusher.flush().await
    }

    fn ensure_ticker(&self, every: Duration) {
        self.ticker.get_or_init(|| {
            info!(push_delay_ms = every.as_millis() as u64, "Starting Mesh flush timer");
            let flusher = Arc::clone(&self.flusher);
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + every, every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let orders = flusher.pending.take();
                    if orders.is_empty() {
                        continue;
                    }
                    // A slow or retrying push must not hold back later ticks.
                    let flusher = Arc::clone(&flusher);
                    tokio::spawn(async move { flusher.push(orders).await });
                }
            })
        });
    }
}

impl OrderSink for MeshBatcher {
    fn name(&self) -> &'static str {
        "mesh"
    }

    fn accept(&self, orders: Vec<SignedOrder>) {
        match self.push_delay {
            Some(every) => {
                self.flusher.pending.append(orders);
                self.ensure_ticker(every);
            }
            None => {
                let flusher = Arc::clone(&self.flusher);
                tokio::spawn(async move { flusher.push(orders).await });
            }
        }
    }
}

impl Drop for MeshBatcher {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get() {
            ticker.abort();
        }
    }
}
