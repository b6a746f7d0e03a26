//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for orders, pairs and order book snapshots.
//! - [`source`] - In-memory [`OrderBookSource`](crate::port::OrderBookSource).
//! - [`channel`] - Externally controlled [`OrderChannel`](crate::port::OrderChannel).
//! - [`sink`] - Capturing writer, recording sink and scripted SRA submitter.
//! - [`mesh`] - Recording [`MeshRpc`](crate::port::MeshRpc).
//! - [`config`] - Canonical test configurations with short delays.

pub mod channel;
pub mod config;
pub mod domain;
pub mod mesh;
pub mod sink;
pub mod source;
