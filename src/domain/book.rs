//! Paginated listings and order book snapshots.

use serde::{Deserialize, Serialize};

use super::{ApiOrder, SignedOrder};

/// One page of an SRA paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub per_page: u64,
    pub records: Vec<T>,
}

impl<T> Page<T> {
    pub fn from_records(records: Vec<T>) -> Self {
        Self {
            total: records.len() as u64,
            page: 1,
            per_page: records.len() as u64,
            records,
        }
    }
}

/// Resting orders for one base/quote pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    pub bids: Page<ApiOrder>,
    pub asks: Page<ApiOrder>,
}

impl OrderbookSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.asks.records.len() + self.bids.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All orders on the book, asks first then bids.
    #[must_use]
    pub fn into_orders(self) -> Vec<SignedOrder> {
        self.asks
            .records
            .into_iter()
            .chain(self.bids.records)
            .map(SignedOrder::from)
            .collect()
    }
}
