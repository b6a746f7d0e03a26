//! Builders for domain primitives used across tests.

use crate::domain::{ApiOrder, AssetPair, OrderbookSnapshot, Page, SignedOrder, UintString};

/// A signed order from `maker` with the given salt. Other fields are fixed.
pub fn order(maker: &str, salt: u64) -> SignedOrder {
    SignedOrder {
        maker_address: maker.to_string(),
        taker_address: "0x0000000000000000000000000000000000000000".into(),
        fee_recipient_address: "0xa258b39954cef5cb142fd567a46cddb31a670124".into(),
        sender_address: "0x0000000000000000000000000000000000000000".into(),
        maker_asset_amount: UintString::from(1_000_000_000_000_000_000),
        taker_asset_amount: UintString::from(2_000_000),
        maker_fee: UintString::from(0),
        taker_fee: UintString::from(0),
        expiration_time_seconds: UintString::from(1_592_000_000),
        salt: UintString::from(salt),
        maker_asset_data: "0xf47261b0aa".into(),
        taker_asset_data: "0xf47261b0bb".into(),
        maker_fee_asset_data: "0x".into(),
        taker_fee_asset_data: "0x".into(),
        exchange_address: "0x61935cbdd02287b511119ddb11aeb42f1593b7ef".into(),
        chain_id: 1,
        signature: "0x1b02".into(),
    }
}

/// `n` orders from `maker` with salts `1..=n`.
pub fn orders(maker: &str, n: u64) -> Vec<SignedOrder> {
    (1..=n).map(|salt| order(maker, salt)).collect()
}

pub fn pair(a: &str, b: &str) -> AssetPair {
    AssetPair::new(a, b)
}

fn api(order: SignedOrder) -> ApiOrder {
    ApiOrder {
        order,
        meta_data: serde_json::Value::Null,
    }
}

/// A book with `asks` asks then `bids` bids from `maker`, salts numbered across both sides.
pub fn snapshot(maker: &str, asks: u64, bids: u64) -> OrderbookSnapshot {
    let mut all = orders(maker, asks + bids).into_iter().map(api);
    let asks: Vec<_> = all.by_ref().take(asks as usize).collect();
    let bids: Vec<_> = all.collect();
    OrderbookSnapshot {
        bids: Page::from_records(bids),
        asks: Page::from_records(asks),
    }
}

pub fn empty_snapshot() -> OrderbookSnapshot {
    snapshot("0x00", 0, 0)
}
