//! SRA v3 orders channel over WebSocket.
//!
//! # Connection Lifecycle
//!
//! 1. **Connection**: `connect()` opens the socket (TLS for `wss://`)
//! 2. **Subscription**: `subscribe()` sends one `subscribe` frame per direction
//! 3. **Events**: `next_event()` yields updates until the socket goes away
//!
//! This type does not reconnect by itself. A close is reported as
//! [`ChannelEvent::Closed`] and the socket is dropped; the channel driver
//! decides what happens next.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::message::{ChannelMessage, SubscribeMessage};
use crate::domain::{SignedOrder, Subscription};
use crate::error::{Error, Result};
use crate::port::{ChannelEvent, OrderChannel};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket implementation of [`OrderChannel`].
pub struct OrdersChannel {
    url: String,
    ws: Option<WsStream>,
}

impl OrdersChannel {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ws: None,
        }
    }

    fn closed(&mut self, reason: impl Into<String>) -> ChannelEvent {
        self.ws = None;
        ChannelEvent::Closed {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl OrderChannel for OrdersChannel {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to orders channel");
        let (ws_stream, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "Orders channel connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("orders channel not connected".into()))?;

        let json = serde_json::to_string(&SubscribeMessage::new(subscription))?;
        debug!(
            maker_asset_data = %subscription.maker_asset_data,
            taker_asset_data = %subscription.taker_asset_data,
            "Subscribing"
        );
        ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> ChannelEvent {
        let Some(ws) = self.ws.as_mut() else {
            return ChannelEvent::Closed {
                reason: "not connected".into(),
            };
        };

        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ChannelMessage>(&text) {
                        Ok(ChannelMessage::Update(update)) => {
                            let orders: Vec<SignedOrder> =
                                update.payload.into_iter().map(SignedOrder::from).collect();
                            return ChannelEvent::Update(orders);
                        }
                        Ok(ChannelMessage::Unknown) => {
                            debug!(raw = %text, "Ignoring message");
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to parse channel message");
                            return ChannelEvent::Error(format!("unparseable message: {e}"));
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    debug!("Received ping");
                    let pong = ws.send(Message::Pong(data)).await;
                    if let Err(e) = pong {
                        return self.closed(format!("failed to send pong: {e}"));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|f| f.reason.to_string()).unwrap_or_default();
                    return self.closed(format!("closed by server: {reason}"));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return self.closed(e.to_string()),
                None => return self.closed("stream ended"),
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
