//! Adapters implementing the ports against real services.
//!
//! - [`sra`] - Standard Relayer API v3 (REST + orders WebSocket channel)
//! - [`mesh`] - Mesh node JSON-RPC

pub mod mesh;
pub mod sra;
