//! Standard Relayer API v3 REST client.
//!
//! Provides the read side (`/asset_pairs`, `/orderbook`) used to discover
//! and bootstrap order books, and the write side (`POST /order`) used when
//! forwarding orders to another relayer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::domain::{AssetData, AssetPair, OrderbookSnapshot, Page, SignedOrder};
use crate::error::{Error, Result};
use crate::port::{OrderBookSource, OrderSubmitter};

/// HTTP client for one SRA endpoint.
#[derive(Debug, Clone)]
pub struct SraClient {
    client: Client,
    base_url: String,
}

impl SraClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client for the given base URL (e.g. `https://api.radarrelay.com/0x/v3`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, ?query, "GET");
        let response = self.client.get(&url).query(query).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// Map non-2xx responses to [`Error::Status`], keeping the body for logs.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl OrderBookSource for SraClient {
    async fn asset_pairs(&self, per_page: u32) -> Result<Vec<AssetPair>> {
        let per_page = per_page.to_string();
        let page: Page<AssetPair> = self
            .get_json("asset_pairs", &[("page", "1"), ("perPage", &per_page)])
            .await?;

        info!(
            total = page.total,
            returned = page.records.len(),
            "Fetched asset pairs"
        );
        Ok(page.records)
    }

    async fn orderbook(&self, base: &AssetData, quote: &AssetData) -> Result<OrderbookSnapshot> {
        self.get_json(
            "orderbook",
            &[
                ("baseAssetData", base.as_str()),
                ("quoteAssetData", quote.as_str()),
            ],
        )
        .await
    }
}

#[async_trait]
impl OrderSubmitter for SraClient {
    async fn submit_order(&self, order: &SignedOrder) -> Result<()> {
        let url = self.url("order");
        debug!(url = %url, maker = %order.maker_address, salt = %order.salt, "POST order");
        let response = self.client.post(&url).json(order).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
