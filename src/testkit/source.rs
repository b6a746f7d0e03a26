//! In-memory [`OrderBookSource`] with scripted failures and call counts.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::domain::empty_snapshot;
use crate::domain::{AssetData, AssetPair, OrderbookSnapshot};
use crate::error::{Error, Result};
use crate::port::OrderBookSource;

type BookKey = (AssetData, AssetData);

fn key(pair: &AssetPair) -> BookKey {
    (pair.base().clone(), pair.quote().clone())
}

/// Serves a fixed pair listing and per-pair books.
///
/// Pairs without a configured book return an empty snapshot.
pub struct StaticSource {
    pairs: Vec<AssetPair>,
    books: HashMap<BookKey, OrderbookSnapshot>,
    failing_books: HashSet<BookKey>,
    asset_pairs_failures: AtomicU32,
    asset_pairs_calls: AtomicU32,
    last_per_page: Mutex<Option<u32>>,
    orderbook_calls: Mutex<HashMap<BookKey, u32>>,
}

impl StaticSource {
    pub fn new(pairs: Vec<AssetPair>) -> Self {
        Self {
            pairs,
            books: HashMap::new(),
            failing_books: HashSet::new(),
            asset_pairs_failures: AtomicU32::new(0),
            asset_pairs_calls: AtomicU32::new(0),
            last_per_page: Mutex::new(None),
            orderbook_calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_book(mut self, pair: &AssetPair, book: OrderbookSnapshot) -> Self {
        self.books.insert(key(pair), book);
        self
    }

    /// Every order book request for `pair` fails.
    pub fn failing_book(mut self, pair: &AssetPair) -> Self {
        self.failing_books.insert(key(pair));
        self
    }

    /// The first `n` pair listings fail.
    pub fn failing_asset_pairs(self, n: u32) -> Self {
        self.asset_pairs_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn asset_pairs_calls(&self) -> u32 {
        self.asset_pairs_calls.load(Ordering::SeqCst)
    }

    pub fn last_per_page(&self) -> Option<u32> {
        *self.last_per_page.lock()
    }

    pub fn orderbook_calls(&self, pair: &AssetPair) -> u32 {
        self.orderbook_calls
            .lock()
            .get(&key(pair))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl OrderBookSource for StaticSource {
    async fn asset_pairs(&self, per_page: u32) -> Result<Vec<AssetPair>> {
        self.asset_pairs_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_per_page.lock() = Some(per_page);

        let remaining = self.asset_pairs_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.asset_pairs_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.pairs.clone())
    }

    async fn orderbook(&self, base: &AssetData, quote: &AssetData) -> Result<OrderbookSnapshot> {
        let key = (base.clone(), quote.clone());
        *self.orderbook_calls.lock().entry(key.clone()).or_insert(0) += 1;

        if self.failing_books.contains(&key) {
            return Err(Error::Connection(format!("no book for {base}/{quote}")));
        }
        Ok(self.books.get(&key).cloned().unwrap_or_else(empty_snapshot))
    }
}
