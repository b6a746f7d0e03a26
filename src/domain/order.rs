//! Signed 0x orders as relayed between services.

use serde::{Deserialize, Serialize};

use super::{AssetData, UintString};

/// A 0x v3 signed order.
///
/// The relay treats it as opaque apart from the maker address. Numeric
/// fields are [`UintString`]s so they are always forwarded as decimal
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    pub maker_address: String,
    pub taker_address: String,
    pub fee_recipient_address: String,
    pub sender_address: String,
    pub maker_asset_amount: UintString,
    pub taker_asset_amount: UintString,
    pub maker_fee: UintString,
    pub taker_fee: UintString,
    pub expiration_time_seconds: UintString,
    pub salt: UintString,
    pub maker_asset_data: AssetData,
    pub taker_asset_data: AssetData,
    pub maker_fee_asset_data: AssetData,
    pub taker_fee_asset_data: AssetData,
    pub exchange_address: String,
    pub chain_id: u64,
    pub signature: String,
}

impl SignedOrder {
    /// Compare the maker against an already lower-cased address.
    #[must_use]
    pub fn is_made_by(&self, lowercase_maker: &str) -> bool {
        self.maker_address.to_lowercase() == lowercase_maker
    }
}

/// An order as listed by the relayer, with relayer-specific metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrder {
    pub order: SignedOrder,
    #[serde(default)]
    pub meta_data: serde_json::Value,
}

impl From<ApiOrder> for SignedOrder {
    fn from(api: ApiOrder) -> Self {
        api.order
    }
}
