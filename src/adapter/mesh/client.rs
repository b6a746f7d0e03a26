//! Mesh JSON-RPC client.
//!
//! Mesh nodes expose their RPC API over WebSocket and, on newer builds,
//! plain HTTP. The transport is picked from the endpoint scheme. The
//! WebSocket connection is opened lazily and dropped on any transport
//! error or timeout, so the next call (usually the retry executor's next
//! attempt) reconnects. Both transports bound each call by the client
//! timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use url::Url;

use super::rpc::{RpcEnvelopeId, RpcRequest, RpcResponse};
use crate::domain::SignedOrder;
use crate::error::{ConfigError, Error, Result};
use crate::port::{MeshRpc, ValidationResults};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ADD_ORDERS: &str = "mesh_addOrders";

enum Transport {
    Http { client: reqwest::Client },
    WebSocket { conn: Mutex<Option<WsStream>> },
}

/// JSON-RPC client for a Mesh node.
pub struct MeshClient {
    endpoint: String,
    transport: Transport,
    timeout: Duration,
    next_id: AtomicU64,
}

impl MeshClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client; `ws(s)://` endpoints use WebSocket, `http(s)://` use POST.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable URLs or unsupported schemes.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client whose calls give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable URLs or unsupported schemes.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(endpoint)?;
        let transport = match url.scheme() {
            "http" | "https" => Transport::Http {
                client: reqwest::Client::builder()
                    .timeout(timeout)
                    .build()?,
            },
            "ws" | "wss" => Transport::WebSocket {
                conn: Mutex::new(None),
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "to_mesh",
                    reason: format!("unsupported scheme {other:?}"),
                }
                .into())
            }
        };

        Ok(Self {
            endpoint: endpoint.to_string(),
            transport,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<P, T>(&self, method: &str, params: P) -> Result<T>
    where
        P: Serialize + Send + Sync,
        T: DeserializeOwned + Send,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        let response: RpcResponse<T> = match &self.transport {
            Transport::Http { client } => {
                let response = client.post(&self.endpoint).json(&request).send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
                response.json().await?
            }
            Transport::WebSocket { conn } => {
                let frame = serde_json::to_string(&request)?;
                let mut guard = conn.lock().await;
                let exchanged = timeout(self.timeout, self.exchange_ws(&mut guard, id, frame)).await;
                let result = exchanged.unwrap_or_else(|_| {
                    Err(Error::Connection(format!(
                        "Mesh did not answer within {}ms",
                        self.timeout.as_millis()
                    )))
                });
                if result.is_err() {
                    // Force a fresh connection on the next call.
                    *guard = None;
                }
                serde_json::from_str(&result?)?
            }
        };

        response.into_result()
    }

    /// Send one frame and wait for the response carrying `id`.
    async fn exchange_ws(&self, conn: &mut Option<WsStream>, id: u64, frame: String) -> Result<String> {
        if conn.is_none() {
            info!(url = %self.endpoint, "Connecting to Mesh");
            let (ws, _) = connect_async(self.endpoint.as_str()).await?;
            *conn = Some(ws);
        }
        let ws = conn
            .as_mut()
            .ok_or_else(|| Error::Connection("Mesh connection unavailable".into()))?;

        ws.send(Message::Text(frame)).await?;

        while let Some(message) = ws.next().await {
            match message? {
                Message::Text(text) => {
                    let envelope: RpcEnvelopeId = serde_json::from_str(&text)?;
                    if envelope.id == Some(id) {
                        return Ok(text);
                    }
                    debug!(raw = %text, "Skipping unrelated Mesh frame");
                }
                Message::Ping(data) => ws.send(Message::Pong(data)).await?,
                Message::Close(frame) => {
                    return Err(Error::Connection(format!("Mesh closed connection: {frame:?}")));
                }
                _ => {}
            }
        }

        Err(Error::Connection("Mesh connection ended".into()))
    }
}

#[async_trait]
impl MeshRpc for MeshClient {
    async fn add_orders(&self, orders: &[SignedOrder]) -> Result<ValidationResults> {
        debug!(count = orders.len(), "mesh_addOrders");
        self.call(ADD_ORDERS, [orders]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_transport_from_scheme() {
        assert!(matches!(
            MeshClient::new("ws://localhost:60557").unwrap().transport,
            Transport::WebSocket { .. }
        ));
        assert!(matches!(
            MeshClient::new("https://mesh.example.org/rpc").unwrap().transport,
            Transport::Http { .. }
        ));
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(matches!(
            MeshClient::new("ftp://mesh.example.org"),
            Err(Error::Config(ConfigError::InvalidValue { field: "to_mesh", .. }))
        ));
    }
}
