//! Order book bootstrap for one subscription group.
//!
//! Pairs are fetched in small concurrent batches with a pacing delay after
//! each batch. A pair whose book is large enough has its orders routed and
//! both directions subscribed on the group's orders channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::{info, warn};

use super::channel::ChannelHandle;
use super::router::OrderRouter;
use crate::domain::AssetPair;
use crate::port::OrderBookSource;
use crate::retry::{self, RetryPolicy};

/// Tuning for [`bootstrap_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapSettings {
    /// Pairs fetched concurrently.
    pub batch_size: usize,
    /// Books with this many orders or fewer are skipped.
    pub min_orderbook_size: usize,
    /// Sleep after every batch.
    pub pacing: Duration,
    pub pull: RetryPolicy,
}

impl BootstrapSettings {
    pub const DEFAULT_BATCH_SIZE: usize = 5;
    pub const DEFAULT_MIN_ORDERBOOK_SIZE: usize = 2;
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        let pull = RetryPolicy::default();
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            min_orderbook_size: Self::DEFAULT_MIN_ORDERBOOK_SIZE,
            pacing: pull.interval,
            pull,
        }
    }
}

/// Per-group tally, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub subscribed: usize,
    pub too_small: usize,
    pub failed: usize,
    pub forwarded: usize,
    /// Pairs never fetched because the group's channel driver had stopped.
    pub abandoned: usize,
}

enum PairOutcome {
    Subscribed(usize),
    TooSmall,
    Failed,
}

/// Fetch, route and subscribe every pair in `pairs`.
///
/// A pair whose book cannot be fetched is logged and skipped; nothing here
/// fails the group. Remaining batches are abandoned once the channel driver
/// behind `channel` has stopped.
pub async fn bootstrap_group(
    source: &dyn OrderBookSource,
    pairs: &[AssetPair],
    router: &OrderRouter,
    channel: &ChannelHandle,
    settings: &BootstrapSettings,
) -> BootstrapSummary {
    let total = pairs.len();
    let done = AtomicUsize::new(0);
    let mut summary = BootstrapSummary::default();

    for (index, batch) in pairs.chunks(settings.batch_size.max(1)).enumerate() {
        if channel.is_closed() {
            let started = index * settings.batch_size.max(1);
            summary.abandoned = total - started;
            warn!(
                abandoned = summary.abandoned,
                "Orders channel driver stopped, abandoning group bootstrap"
            );
            break;
        }

        let outcomes = join_all(
            batch
                .iter()
                .map(|pair| bootstrap_pair(source, pair, router, channel, settings, &done, total)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                PairOutcome::Subscribed(count) => {
                    summary.subscribed += 1;
                    summary.forwarded += count;
                }
                PairOutcome::TooSmall => summary.too_small += 1,
                PairOutcome::Failed => summary.failed += 1,
            }
        }

        sleep(settings.pacing).await;
    }

    info!(
        pairs = total,
        subscribed = summary.subscribed,
        too_small = summary.too_small,
        failed = summary.failed,
        forwarded = summary.forwarded,
        abandoned = summary.abandoned,
        "Subscription group bootstrapped"
    );
    summary
}

async fn bootstrap_pair(
    source: &dyn OrderBookSource,
    pair: &AssetPair,
    router: &OrderRouter,
    channel: &ChannelHandle,
    settings: &BootstrapSettings,
    done: &AtomicUsize,
    total: usize,
) -> PairOutcome {
    let fetched = retry::attempt(&settings.pull, "orderbook", || {
        source.orderbook(pair.base(), pair.quote())
    })
    .await;
    let n = done.fetch_add(1, Ordering::SeqCst) + 1;

    let book = match fetched {
        Ok(book) => book,
        Err(e) => {
            warn!(progress = %format!("{n}/{total}"), pair = %pair, error = %e.last_cause(), "Skipping pair");
            return PairOutcome::Failed;
        }
    };

    let orders = book.into_orders();
    let count = orders.len();
    if count <= settings.min_orderbook_size {
        info!(pair = %pair, orders = count, "Orderbook too small");
        return PairOutcome::TooSmall;
    }

    info!(progress = %format!("{n}/{total}"), pair = %pair, orders = count, "Orderbook added");
    router.route(orders);
    for subscription in pair.subscriptions() {
        if !channel.subscribe(subscription) {
            warn!(pair = %pair, "Orders channel driver stopped, subscription dropped");
        }
    }
    PairOutcome::Subscribed(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::channel::subscription_queue;
    use crate::relay::sink::ConsoleSink;
    use crate::testkit::domain::{pair, snapshot};
    use crate::testkit::sink::CaptureWriter;
    use crate::testkit::source::StaticSource;
    use std::sync::Arc;

    fn settings() -> BootstrapSettings {
        BootstrapSettings {
            batch_size: 5,
            min_orderbook_size: 2,
            pacing: Duration::from_millis(1000),
            pull: RetryPolicy::new(Duration::from_millis(10), 3),
        }
    }

    fn console() -> (OrderRouter, CaptureWriter) {
        let writer = CaptureWriter::new();
        let router = OrderRouter::new(Arc::new(ConsoleSink::new(writer.clone())), None);
        (router, writer)
    }

    #[tokio::test(start_paused = true)]
    async fn small_books_are_neither_forwarded_nor_subscribed() {
        let pairs = vec![pair("0x01", "0x02"), pair("0x03", "0x04"), pair("0x05", "0x06")];
        let source = StaticSource::new(pairs.clone())
            .with_book(&pairs[0], snapshot("0xaa", 1, 0))
            .with_book(&pairs[1], snapshot("0xaa", 0, 1))
            .with_book(&pairs[2], snapshot("0xaa", 1, 0));
        let (router, writer) = console();
        let (handle, mut subscriptions) = subscription_queue();

        let summary = bootstrap_group(&source, &pairs, &router, &handle, &settings()).await;

        assert_eq!(summary.too_small, 3);
        assert_eq!(summary.subscribed, 0);
        assert!(writer.lines().is_empty());
        assert!(subscriptions.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn large_book_is_printed_and_subscribed_both_ways() {
        let pairs = vec![pair("0xaa", "0xbb")];
        let source = StaticSource::new(pairs.clone()).with_book(&pairs[0], snapshot("0xcc", 3, 2));
        let (router, writer) = console();
        let (handle, mut subscriptions) = subscription_queue();

        let summary = bootstrap_group(&source, &pairs, &router, &handle, &settings()).await;

        assert_eq!(summary.subscribed, 1);
        assert_eq!(summary.forwarded, 5);
        assert_eq!(writer.lines().len(), 5);

        let [ab, ba] = pairs[0].subscriptions();
        assert_eq!(subscriptions.try_recv().unwrap(), ab);
        assert_eq!(subscriptions.try_recv().unwrap(), ba);
        assert!(subscriptions.try_recv().is_err());
        assert_eq!(ab.maker_asset_data.as_str(), "0xaa");
        assert_eq!(ba.maker_asset_data.as_str(), "0xbb");
    }

    #[tokio::test(start_paused = true)]
    async fn failing_pair_is_skipped_without_stopping_batch() {
        let pairs = vec![pair("0x01", "0x02"), pair("0x03", "0x04")];
        let source = StaticSource::new(pairs.clone())
            .with_book(&pairs[1], snapshot("0xaa", 2, 2))
            .failing_book(&pairs[0]);
        let (router, writer) = console();
        let (handle, _subscriptions) = subscription_queue();

        let summary = bootstrap_group(&source, &pairs, &router, &handle, &settings()).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.subscribed, 1);
        assert_eq!(writer.lines().len(), 4);
        assert_eq!(source.orderbook_calls(&pairs[0]), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn batches_are_paced() {
        let pairs: Vec<_> = (0..12).map(|i| pair(&format!("0x{i:02}"), "0xff")).collect();
        let source = StaticSource::new(pairs.clone());
        let (router, _writer) = console();
        let (handle, _subscriptions) = subscription_queue();

        let start = tokio::time::Instant::now();
        let summary = bootstrap_group(&source, &pairs, &router, &handle, &settings()).await;

        // Three batches of at most five, one pacing sleep after each.
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
        assert_eq!(summary.too_small, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_driver_abandons_remaining_batches() {
        let pairs: Vec<_> = (0..12).map(|i| pair(&format!("0x{i:02}"), "0xff")).collect();
        let mut source = StaticSource::new(pairs.clone());
        for p in &pairs {
            source = source.with_book(p, snapshot("0xaa", 3, 0));
        }
        let (router, writer) = console();
        let (handle, subscriptions) = subscription_queue();
        drop(subscriptions);

        let summary = bootstrap_group(&source, &pairs, &router, &handle, &settings()).await;

        assert_eq!(summary.abandoned, 12);
        assert_eq!(summary.subscribed, 0);
        assert!(writer.lines().is_empty());
        assert_eq!(source.orderbook_calls(&pairs[0]), 0);
    }
}
