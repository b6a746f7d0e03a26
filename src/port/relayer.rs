//! Standard Relayer API REST ports.

use async_trait::async_trait;

use crate::domain::{AssetData, AssetPair, OrderbookSnapshot, SignedOrder};
use crate::error::Result;

/// Read side of a relayer: tradable pairs and resting orders.
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    /// Fetch the first page of asset pairs.
    ///
    /// Pagination beyond the first page is not followed.
    async fn asset_pairs(&self, per_page: u32) -> Result<Vec<AssetPair>>;

    /// Fetch the order book for `base`/`quote`.
    async fn orderbook(&self, base: &AssetData, quote: &AssetData) -> Result<OrderbookSnapshot>;
}

/// Write side of a relayer.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit one signed order.
    async fn submit_order(&self, order: &SignedOrder) -> Result<()>;
}
