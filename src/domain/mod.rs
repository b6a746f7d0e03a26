//! Relay domain types: assets, pairs, orders and order books.

mod asset;
mod book;
mod order;
mod uint;

pub use asset::{AssetData, AssetDataDescriptor, AssetPair, Subscription};
pub use book::{OrderbookSnapshot, Page};
pub use order::{ApiOrder, SignedOrder};
pub use uint::UintString;
