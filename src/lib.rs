//! sra-relay - pull 0x Standard Relayer API order books and relay them.
//!
//! Orders are read from one relayer over REST and its orders WebSocket
//! channel, optionally filtered by asset pair and maker, and delivered to
//! exactly one destination: another relayer, a Mesh node, or stdout.
//!
//! # Modules
//!
//! - [`domain`] - Assets, pairs, signed orders, order book snapshots
//! - [`port`] - Traits the relay talks to (order book source, orders channel, Mesh)
//! - [`adapter`] - SRA and Mesh implementations of the ports
//! - [`relay`] - Discovery, bootstrap, channel drivers, routing and sinks
//! - [`retry`] - Bounded retry with linear or fixed backoff
//! - [`config`] - TOML configuration, validation and logging setup
//! - [`cli`] - `cat` and `check` commands
//! - [`error`] - Error types for the crate

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod relay;
pub mod retry;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
