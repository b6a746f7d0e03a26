//! Push channel port for order updates.

use async_trait::async_trait;

use crate::domain::{SignedOrder, Subscription};
use crate::error::Result;

/// Something that happened on an orders channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Orders pushed for one of our subscriptions.
    Update(Vec<SignedOrder>),
    /// A recoverable problem; the connection is still usable.
    Error(String),
    /// The connection is gone and must be re-established.
    Closed { reason: String },
}

/// Real-time order updates from a relayer.
///
/// Implementations handle connection management, subscriptions, and message
/// parsing for their specific protocol.
#[async_trait]
pub trait OrderChannel: Send {
    /// Open (or re-open) the connection.
    async fn connect(&mut self) -> Result<()>;

    /// Request updates for one maker/taker direction.
    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()>;

    /// Wait for the next event.
    ///
    /// Returns [`ChannelEvent::Closed`] immediately when not connected.
    async fn next_event(&mut self) -> ChannelEvent;

    /// Endpoint for logging.
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl OrderChannel for Box<dyn OrderChannel> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        (**self).subscribe(subscription).await
    }

    async fn next_event(&mut self) -> ChannelEvent {
        (**self).next_event().await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
