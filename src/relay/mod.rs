//! The relay: discovery, bootstrap, push updates and delivery.
//!
//! ```text
//! discover ──▶ group 1 ─┬─ ChannelDriver ──┐
//!              group 2 ─┤  bootstrap ──────┼──▶ OrderRouter ──▶ OrderSink
//!              …        ┘                  │
//!                         update events ───┘
//! ```

mod batch;
mod bootstrap;
mod channel;
mod discovery;
mod report;
mod router;
mod sink;

use std::sync::Arc;

use futures_util::future::select_all;
use tokio::time::sleep;
use tracing::{info, warn};

pub use batch::{MeshBatcher, PendingBatch};
pub use bootstrap::{bootstrap_group, BootstrapSettings, BootstrapSummary};
pub use channel::{subscription_queue, ChannelDriver, ChannelHandle, ClosePolicy};
pub use discovery::{discover, AssetPairFilter};
pub use report::{outcome_channel, spawn_reporter, DeliveryOutcome, OutcomeReceiver, OutcomeSender};
pub use router::OrderRouter;
pub use sink::{ConsoleSink, OrderSink, SraForwardSink};

use crate::adapter::mesh::MeshClient;
use crate::adapter::sra::{OrdersChannel, SraClient};
use crate::config::Config;
use crate::domain::AssetPair;
use crate::error::{Error, Result};
use crate::port::{OrderBookSource, OrderChannel};

/// Run discovery until the source answers.
///
/// An exhausted discovery attempt is logged and retried after the pull delay;
/// the relay has nothing to do until the pair listing succeeds.
async fn discover_until_listed(source: &dyn OrderBookSource, config: &Config) -> Vec<AssetPair> {
    let filter = config.pair_filter();
    let policy = config.pull_policy();
    loop {
        let listed = discover(source, &filter, config.source.asset_pairs_per_page, &policy).await;
        match listed {
            Ok(pairs) => return pairs,
            Err(e) => {
                warn!(
                    error = %e.last_cause(),
                    retry_in_ms = policy.interval.as_millis() as u64,
                    "Asset pair discovery failed, retrying"
                );
                sleep(policy.interval).await;
            }
        }
    }
}

/// Build the single sink selected by configuration.
///
/// # Errors
///
/// Fails when a destination client cannot be constructed.
pub fn build_sink(config: &Config, outcomes: OutcomeSender) -> Result<Arc<dyn OrderSink>> {
    if let Some(to_sra) = &config.sink.to_sra {
        let client = SraClient::new(to_sra.as_str())?;
        return Ok(Arc::new(SraForwardSink::new(
            Arc::new(client),
            config.push_policy(),
            outcomes,
        )));
    }
    if let Some(to_mesh) = &config.sink.to_mesh {
        let client = MeshClient::new(to_mesh)?;
        return Ok(Arc::new(MeshBatcher::new(
            Arc::new(client),
            config.push_policy(),
            config.push_delay(),
            outcomes,
        )));
    }
    Ok(Arc::new(ConsoleSink::stdout()))
}

/// Run the relay against the configured endpoints until a fatal error.
///
/// # Errors
///
/// Returns an error when a destination client cannot be built or an orders
/// channel closes under [`ClosePolicy::Exit`]. Discovery failures are retried
/// and never end the run.
pub async fn run(config: &Config) -> Result<()> {
    let source = SraClient::new(config.source.http_endpoint.as_str())?;
    let (outcomes, receiver) = outcome_channel();
    let reporter = spawn_reporter(receiver);

    let sink = build_sink(config, outcomes)?;
    let router = Arc::new(OrderRouter::new(sink, config.filter.maker_address.as_deref()));
    info!(
        source = source.base_url(),
        sink = router.sink_name(),
        "Relay starting"
    );

    let ws_endpoint = config.source.ws_endpoint.clone();
    let result = run_with(config, &source, router, || OrdersChannel::new(ws_endpoint.as_str())).await;

    reporter.abort();
    result
}

/// Discovery, per-group bootstrap and channel supervision with injected collaborators.
///
/// Each subscription group gets a fresh channel from `make_channel`. Returns
/// once every channel driver has stopped.
///
/// # Errors
///
/// See [`run`].
pub async fn run_with<C, F>(
    config: &Config,
    source: &dyn OrderBookSource,
    router: Arc<OrderRouter>,
    mut make_channel: F,
) -> Result<()>
where
    C: OrderChannel + 'static,
    F: FnMut() -> C,
{
    let pairs = discover_until_listed(source, config).await;
    if pairs.is_empty() {
        warn!("No asset pairs matched, nothing to relay");
        return Ok(());
    }

    let settings = config.bootstrap_settings();
    let group_size = config.channel.subscription_group_size.max(1);
    let groups = pairs.len().div_ceil(group_size);
    let mut drivers = Vec::with_capacity(groups);

    for (index, group) in pairs.chunks(group_size).enumerate() {
        info!(group = index + 1, groups, pairs = group.len(), "Starting subscription group");
        let (driver, handle) =
            ChannelDriver::new(make_channel(), Arc::clone(&router), config.close_policy());
        drivers.push(driver.spawn());

        bootstrap_group(source, group, &router, &handle, &settings).await;

        if drivers.iter().any(|d| d.is_finished()) {
            break;
        }
    }

    while !drivers.is_empty() {
        let (finished, _, rest) = select_all(drivers).await;
        drivers = rest;
        match finished {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                for driver in &drivers {
                    driver.abort();
                }
                return Err(e);
            }
            Err(e) => {
                for driver in &drivers {
                    driver.abort();
                }
                return Err(Error::Connection(format!("channel driver failed: {e}")));
            }
        }
    }
    Ok(())
}
