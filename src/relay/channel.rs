//! Orders channel driver.
//!
//! One driver task owns one [`OrderChannel`] connection. Bootstrap asks for
//! subscriptions through a [`ChannelHandle`]; the driver records every one of
//! them so a reconnect can restore the full set. Update events go straight
//! to the routing stage without any book size threshold.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::router::OrderRouter;
use crate::domain::Subscription;
use crate::error::{Error, Result};
use crate::port::{ChannelEvent, OrderChannel};

/// What to do when the orders channel closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Wait `delay`, reconnect, and re-send every recorded subscription.
    Reconnect { delay: Duration },
    /// Stop the driver with [`Error::ChannelClosed`].
    Exit,
}

impl ClosePolicy {
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(30);
}

impl Default for ClosePolicy {
    fn default() -> Self {
        Self::Reconnect {
            delay: Self::DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Sends subscription requests to a running [`ChannelDriver`].
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    commands: mpsc::UnboundedSender<Subscription>,
}

impl ChannelHandle {
    /// Queue a subscription. Returns `false` once the driver has stopped.
    pub fn subscribe(&self, subscription: Subscription) -> bool {
        self.commands.send(subscription).is_ok()
    }

    /// Whether the driver behind this handle has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Standalone handle and receiving end, for driving a channel by hand.
#[must_use]
pub fn subscription_queue() -> (ChannelHandle, mpsc::UnboundedReceiver<Subscription>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHandle { commands: tx }, rx)
}

pub struct ChannelDriver<C: OrderChannel> {
    channel: C,
    router: Arc<OrderRouter>,
    policy: ClosePolicy,
    commands: mpsc::UnboundedReceiver<Subscription>,
    subscriptions: Vec<Subscription>,
    connected: bool,
}

impl<C: OrderChannel + 'static> ChannelDriver<C> {
    pub fn new(channel: C, router: Arc<OrderRouter>, policy: ClosePolicy) -> (Self, ChannelHandle) {
        let (handle, commands) = subscription_queue();
        let driver = Self {
            channel,
            router,
            policy,
            commands,
            subscriptions: Vec::new(),
            connected: false,
        };
        (driver, handle)
    }

    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    /// Drive the channel until it closes under [`ClosePolicy::Exit`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] when the channel closes and the
    /// policy is [`ClosePolicy::Exit`].
    pub async fn run(mut self) -> Result<()> {
        info!(endpoint = self.channel.endpoint(), "Connecting orders channel");
        let connected = self.channel.connect().await;
        match connected {
            Ok(()) => self.connected = true,
            Err(e) => self.handle_close(format!("connect failed: {e}")).await?,
        }

        let mut commands_open = true;
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv(), if commands_open => match command {
                    Some(subscription) => self.subscribe(subscription).await?,
                    None => {
                        debug!("Subscription queue closed");
                        commands_open = false;
                    }
                },
                event = self.channel.next_event() => self.handle_event(event).await?,
            }
        }
    }

    async fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        self.subscriptions.push(subscription);
        if !self.connected {
            return Ok(());
        }

        let Some(subscription) = self.subscriptions.last() else {
            return Ok(());
        };
        debug!(
            maker_asset = %subscription.maker_asset_data,
            taker_asset = %subscription.taker_asset_data,
            "Subscribing"
        );
        let sent = self.channel.subscribe(subscription).await;
        if let Err(e) = sent {
            self.handle_close(format!("subscribe failed: {e}")).await?;
        }
        Ok(())
    }

    async fn handle_event(&mut self, event: ChannelEvent) -> Result<()> {
        match event {
            ChannelEvent::Update(orders) => {
                debug!(count = orders.len(), "Orders channel update");
                self.router.route(orders);
                Ok(())
            }
            ChannelEvent::Error(message) => {
                warn!(endpoint = self.channel.endpoint(), error = %message, "Orders channel error");
                Ok(())
            }
            ChannelEvent::Closed { reason } => self.handle_close(reason).await,
        }
    }

    async fn handle_close(&mut self, reason: String) -> Result<()> {
        self.connected = false;
        match self.policy {
            ClosePolicy::Exit => {
                error!(endpoint = self.channel.endpoint(), reason = %reason, "Orders channel closed");
                Err(Error::ChannelClosed { reason })
            }
            ClosePolicy::Reconnect { delay } => {
                warn!(
                    endpoint = self.channel.endpoint(),
                    reason = %reason,
                    delay_ms = delay.as_millis() as u64,
                    "Orders channel closed, reconnecting"
                );
                self.reconnect(delay).await;
                Ok(())
            }
        }
    }

    async fn reconnect(&mut self, delay: Duration) {
        let mut attempt = 0u32;
        'retry: loop {
            attempt += 1;
            sleep(delay).await;

            if let Err(e) = self.channel.connect().await {
                warn!(attempt, error = %e, "Reconnect failed");
                continue;
            }
            for subscription in &self.subscriptions {
                if let Err(e) = self.channel.subscribe(subscription).await {
                    warn!(attempt, error = %e, "Resubscribe failed");
                    continue 'retry;
                }
            }

            info!(
                attempt,
                subscriptions = self.subscriptions.len(),
                "Orders channel reconnected"
            );
            self.connected = true;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::channel::{mock_channel, MockChannel};
    use crate::testkit::domain::{order, pair};
    use crate::testkit::sink::RecordingSink;

    const DELAY: Duration = Duration::from_secs(30);

    fn driver(
        channel: MockChannel,
        policy: ClosePolicy,
    ) -> (ChannelDriver<MockChannel>, ChannelHandle, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let router = Arc::new(OrderRouter::new(sink.clone(), None));
        let (driver, handle) = ChannelDriver::new(channel, router, policy);
        (driver, handle, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn updates_reach_the_sink() {
        let (channel, control) = mock_channel();
        let (driver, _handle, sink) = driver(channel, ClosePolicy::default());
        let task = driver.spawn();

        control.update(vec![order("0xaa", 1), order("0xaa", 2)]);
        control.error("bad frame");
        control.update(vec![order("0xbb", 3)]);
        sleep(Duration::from_millis(10)).await;

        assert_eq!(sink.orders().len(), 3);
        assert_eq!(sink.batches(), 2);
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn close_reconnects_and_resubscribes_everything() {
        let (channel, control) = mock_channel();
        let (driver, handle, _sink) = driver(channel, ClosePolicy::Reconnect { delay: DELAY });
        let task = driver.spawn();

        let [ab, ba] = pair("0xaa", "0xbb").subscriptions();
        let [cd, dc] = pair("0xcc", "0xdd").subscriptions();
        for s in [&ab, &ba, &cd, &dc] {
            assert!(handle.subscribe(s.clone()));
        }
        sleep(Duration::from_millis(10)).await;
        assert_eq!(control.connect_count(), 1);
        assert_eq!(control.subscriptions().len(), 4);

        control.close("server restart");
        sleep(DELAY - Duration::from_secs(1)).await;
        assert_eq!(control.connect_count(), 1, "reconnected before the delay");

        sleep(Duration::from_secs(2)).await;
        assert_eq!(control.connect_count(), 2);
        let sent = control.subscriptions();
        assert_eq!(sent.len(), 8);
        assert_eq!(&sent[4..], &[ab, ba, cd, dc]);
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reconnect_waits_again() {
        let (channel, control) = mock_channel();
        control.fail_next_connects(2);
        let (driver, handle, _sink) = driver(channel, ClosePolicy::Reconnect { delay: DELAY });
        let task = driver.spawn();

        let [ab, _] = pair("0xaa", "0xbb").subscriptions();
        handle.subscribe(ab.clone());

        // Initial connect fails, first reconnect fails, second succeeds.
        sleep(DELAY * 2 + Duration::from_secs(1)).await;
        assert_eq!(control.connect_count(), 3);
        assert_eq!(control.subscriptions(), vec![ab]);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn exit_policy_stops_with_channel_closed() {
        let (channel, control) = mock_channel();
        let (driver, _handle, _sink) = driver(channel, ClosePolicy::Exit);
        let task = driver.spawn();

        control.close("gone");
        let result = task.await.unwrap();

        assert!(matches!(result, Err(Error::ChannelClosed { reason }) if reason == "gone"));
        assert_eq!(control.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_reports_stopped_driver() {
        let (channel, control) = mock_channel();
        let (driver, handle, _sink) = driver(channel, ClosePolicy::Exit);
        let task = driver.spawn();

        control.close("gone");
        let _ = task.await;

        let [ab, _] = pair("0xaa", "0xbb").subscriptions();
        assert!(!handle.subscribe(ab));
    }
}
