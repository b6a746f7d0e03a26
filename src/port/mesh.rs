//! Mesh peer network port.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::SignedOrder;
use crate::error::Result;

/// Batch submission to a Mesh node (`mesh_addOrders`).
#[async_trait]
pub trait MeshRpc: Send + Sync {
    async fn add_orders(&self, orders: &[SignedOrder]) -> Result<ValidationResults>;
}

/// Mesh verdict for a submitted batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResults {
    #[serde(default)]
    pub accepted: Vec<AcceptedOrderInfo>,
    #[serde(default)]
    pub rejected: Vec<RejectedOrderInfo>,
}

impl ValidationResults {
    /// Rejection counts keyed by status code.
    #[must_use]
    pub fn rejected_by_code(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for rejected in &self.rejected {
            *counts.entry(rejected.status.code.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedOrderInfo {
    #[serde(default)]
    pub order_hash: String,
    #[serde(default)]
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedOrderInfo {
    #[serde(default)]
    pub order_hash: String,
    #[serde(default)]
    pub kind: String,
    pub status: RejectedStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedStatus {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
