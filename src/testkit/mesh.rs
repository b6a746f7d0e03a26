//! Recording [`MeshRpc`] double.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::SignedOrder;
use crate::error::{Error, Result};
use crate::port::{
    AcceptedOrderInfo, MeshRpc, RejectedOrderInfo, RejectedStatus, ValidationResults,
};

/// Records every `add_orders` batch and answers with scripted verdicts.
#[derive(Default)]
pub struct RecordingMesh {
    calls: Mutex<Vec<Vec<SignedOrder>>>,
    attempts: AtomicU32,
    latency: Option<Duration>,
    rejected_salts: HashSet<String>,
    reject_code: String,
    failing: bool,
}

impl RecordingMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reject orders with these salts using `code`.
    pub fn rejecting_salts<'a>(mut self, salts: impl IntoIterator<Item = &'a str>, code: &str) -> Self {
        self.rejected_salts = salts.into_iter().map(str::to_string).collect();
        self.reject_code = code.to_string();
        self
    }

    /// Every call fails with a transport error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Batches that reached the node, failed calls excluded.
    pub fn calls(&self) -> Vec<Vec<SignedOrder>> {
        self.calls.lock().clone()
    }

    /// Calls made, including failed ones.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeshRpc for RecordingMesh {
    async fn add_orders(&self, orders: &[SignedOrder]) -> Result<ValidationResults> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing {
            return Err(Error::Connection("mesh unreachable".into()));
        }
        self.calls.lock().push(orders.to_vec());

        let mut results = ValidationResults::default();
        for order in orders {
            let order_hash = format!("0x{}", order.salt);
            if self.rejected_salts.contains(order.salt.as_str()) {
                results.rejected.push(RejectedOrderInfo {
                    order_hash,
                    kind: "MESH_VALIDATION".into(),
                    status: RejectedStatus {
                        code: self.reject_code.clone(),
                        message: "rejected".into(),
                    },
                });
            } else {
                results.accepted.push(AcceptedOrderInfo {
                    order_hash,
                    is_new: true,
                });
            }
        }
        Ok(results)
    }
}
