//! Standard Relayer API v3 adapters: REST client and orders channel.

mod client;
mod message;
mod websocket;

pub use client::SraClient;
pub use message::{ChannelMessage, SubscribeMessage, UpdateMessage};
pub use websocket::OrdersChannel;
