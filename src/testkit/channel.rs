//! Mock [`OrderChannel`] controlled externally via a [`ChannelControl`].
//!
//! Events pushed through the control are read by the consumer via
//! `next_event()`. No real network I/O.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::domain::{SignedOrder, Subscription};
use crate::error::{Error, Result};
use crate::port::{ChannelEvent, OrderChannel};

#[derive(Default)]
struct Shared {
    connect_count: AtomicU32,
    failing_connects: AtomicU32,
    subscriptions: Mutex<Vec<Subscription>>,
}

pub struct MockChannel {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    shared: Arc<Shared>,
    connected: bool,
}

/// Control handle for a [`MockChannel`].
#[derive(Clone)]
pub struct ChannelControl {
    events: mpsc::UnboundedSender<ChannelEvent>,
    shared: Arc<Shared>,
}

impl ChannelControl {
    pub fn update(&self, orders: Vec<SignedOrder>) {
        let _ = self.events.send(ChannelEvent::Update(orders));
    }

    pub fn error(&self, message: &str) {
        let _ = self.events.send(ChannelEvent::Error(message.to_string()));
    }

    /// Close the connection. The driver sees [`ChannelEvent::Closed`].
    pub fn close(&self, reason: &str) {
        let _ = self.events.send(ChannelEvent::Closed {
            reason: reason.to_string(),
        });
    }

    /// Make the next `n` calls to `connect()` fail.
    pub fn fail_next_connects(&self, n: u32) {
        self.shared.failing_connects.store(n, Ordering::SeqCst);
    }

    /// How many times `connect()` was called.
    pub fn connect_count(&self) -> u32 {
        self.shared.connect_count.load(Ordering::SeqCst)
    }

    /// Every subscription sent, in order, across reconnects.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.shared.subscriptions.lock().clone()
    }
}

/// Create a [`MockChannel`] and its [`ChannelControl`].
pub fn mock_channel() -> (MockChannel, ChannelControl) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared::default());
    (
        MockChannel {
            events: rx,
            shared: Arc::clone(&shared),
            connected: false,
        },
        ChannelControl { events: tx, shared },
    )
}

#[async_trait]
impl OrderChannel for MockChannel {
    async fn connect(&mut self) -> Result<()> {
        self.shared.connect_count.fetch_add(1, Ordering::SeqCst);
        let failing = self.shared.failing_connects.load(Ordering::SeqCst);
        if failing > 0 {
            self.shared.failing_connects.store(failing - 1, Ordering::SeqCst);
            return Err(Error::Connection("connection refused".into()));
        }
        self.connected = true;
        Ok(())
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        if !self.connected {
            return Err(Error::Connection("not connected".into()));
        }
        self.shared.subscriptions.lock().push(subscription.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> ChannelEvent {
        if !self.connected {
            return ChannelEvent::Closed {
                reason: "not connected".into(),
            };
        }
        match self.events.recv().await {
            Some(event) => {
                if matches!(event, ChannelEvent::Closed { .. }) {
                    self.connected = false;
                }
                event
            }
            // Control dropped: stay open and silent.
            None => std::future::pending().await,
        }
    }

    fn endpoint(&self) -> &str {
        "mock://orders"
    }
}
