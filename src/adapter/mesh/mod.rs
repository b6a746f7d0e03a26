//! Mesh peer network adapter (JSON-RPC over WebSocket or HTTP).

mod client;
mod rpc;

pub use client::MeshClient;
