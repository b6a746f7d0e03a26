#![allow(dead_code)]

use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

pub type ServerSocket = WebSocketStream<TcpStream>;

/// A v3 signed order as a relayer serves it; two numeric fields are bare integers.
pub fn order_json(maker: &str, salt: &str) -> Value {
    json!({
        "makerAddress": maker,
        "takerAddress": "0x0000000000000000000000000000000000000000",
        "feeRecipientAddress": "0xa258b39954cef5cb142fd567a46cddb31a670124",
        "senderAddress": "0x0000000000000000000000000000000000000000",
        "makerAssetAmount": "10000000000000000000",
        "takerAssetAmount": 20000000,
        "makerFee": "0",
        "takerFee": "0",
        "expirationTimeSeconds": 1592000000,
        "salt": salt,
        "makerAssetData": "0xf47261b0aa",
        "takerAssetData": "0xf47261b0bb",
        "makerFeeAssetData": "0x",
        "takerFeeAssetData": "0x",
        "exchangeAddress": "0x61935cbdd02287b511119ddb11aeb42f1593b7ef",
        "chainId": 1,
        "signature": "0x1b02"
    })
}

pub fn page(records: Vec<Value>) -> Value {
    json!({
        "total": records.len(),
        "page": 1,
        "perPage": 100,
        "records": records
    })
}

pub fn asset_pair_json(a: &str, b: &str) -> Value {
    json!({
        "assetDataA": { "assetData": a, "minAmount": "0", "maxAmount": "1000000000000000000000", "precision": 18 },
        "assetDataB": { "assetData": b, "minAmount": "0", "maxAmount": "1000000000000000000000", "precision": 6 }
    })
}

/// Write `contents` to a temporary `.toml` file that lives as long as the handle.
pub fn temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

/// Local WebSocket server; every accepted connection runs the handler.
pub struct WsServer {
    pub url: String,
    connections: Arc<AtomicU32>,
}

impl WsServer {
    /// Connections accepted so far, numbered from 1 in the handler.
    pub fn connections(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Serve on an ephemeral port. The handler gets the socket and its 1-based
/// connection number.
pub async fn ws_server<F, Fut>(handler: F) -> WsServer
where
    F: Fn(ServerSocket, u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&connections);
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Ok(ws) = accept_async(stream).await {
                    handler(ws, n).await;
                }
            });
        }
    });

    WsServer {
        url: format!("ws://{addr}"),
        connections,
    }
}

/// Next text frame from the peer as JSON, skipping control frames.
pub async fn next_json(ws: &mut ServerSocket) -> Option<Value> {
    while let Some(Ok(message)) = ws.next().await {
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).ok();
        }
    }
    None
}

/// An SRA `update` frame carrying one order per salt.
pub fn update_frame(maker: &str, salts: &[&str]) -> String {
    let payload: Vec<Value> = salts
        .iter()
        .map(|salt| json!({ "order": order_json(maker, salt), "metaData": {} }))
        .collect();
    json!({
        "type": "update",
        "channel": "orders",
        "requestId": "5b1c3a7e-0000-4000-8000-000000000000",
        "payload": payload
    })
    .to_string()
}
