//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The relay core never talks to the network directly. It talks to these
//! traits, and `adapter` provides the SRA and Mesh implementations.
//!
//! ```text
//!   ┌──────────────┐   OrderBookSource    ┌─────────────┐
//!   │              │◀─────────────────────│ SRA (REST)  │
//!   │              │   OrderChannel       ├─────────────┤
//!   │    relay     │◀─────────────────────│ SRA (WS)    │
//!   │              │   OrderSubmitter     ├─────────────┤
//!   │              │─────────────────────▶│ SRA (REST)  │
//!   │              │   MeshRpc            ├─────────────┤
//!   │              │─────────────────────▶│ Mesh node   │
//!   └──────────────┘                      └─────────────┘
//! ```

mod channel;
mod mesh;
mod relayer;

pub use channel::{ChannelEvent, OrderChannel};
pub use mesh::{AcceptedOrderInfo, MeshRpc, RejectedOrderInfo, RejectedStatus, ValidationResults};
pub use relayer::{OrderBookSource, OrderSubmitter};
