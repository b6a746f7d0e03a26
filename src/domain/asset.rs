//! Asset descriptors, tradable pairs and orders-channel subscriptions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UintString;

/// ABI-encoded asset data (`0x…`) identifying a token or token bundle.
///
/// Opaque to the relay; compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetData(String);

impl AssetData {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssetData {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AssetData {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One side of an asset pair as listed by `GET /asset_pairs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDataDescriptor {
    pub asset_data: AssetData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<UintString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<UintString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl From<AssetData> for AssetDataDescriptor {
    fn from(asset_data: AssetData) -> Self {
        Self {
            asset_data,
            min_amount: None,
            max_amount: None,
            precision: None,
        }
    }
}

/// A tradable pair. Used only as a lookup and subscription key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPair {
    pub asset_data_a: AssetDataDescriptor,
    pub asset_data_b: AssetDataDescriptor,
}

impl AssetPair {
    pub fn new(a: impl Into<AssetData>, b: impl Into<AssetData>) -> Self {
        Self {
            asset_data_a: AssetDataDescriptor::from(a.into()),
            asset_data_b: AssetDataDescriptor::from(b.into()),
        }
    }

    /// Asset data used as the order book base.
    #[must_use]
    pub fn base(&self) -> &AssetData {
        &self.asset_data_a.asset_data
    }

    /// Asset data used as the order book quote.
    #[must_use]
    pub fn quote(&self) -> &AssetData {
        &self.asset_data_b.asset_data
    }

    /// Whether `asset` appears on either side of the pair.
    #[must_use]
    pub fn contains(&self, asset: &AssetData) -> bool {
        self.base() == asset || self.quote() == asset
    }

    /// Both directional subscriptions for this pair: A→B then B→A.
    ///
    /// Updates are pushed per maker/taker direction, so both are needed to
    /// see every order on the book.
    #[must_use]
    pub fn subscriptions(&self) -> [Subscription; 2] {
        [
            Subscription::new(self.base().clone(), self.quote().clone()),
            Subscription::new(self.quote().clone(), self.base().clone()),
        ]
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.quote())
    }
}

/// Payload of an orders-channel `subscribe` request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub maker_asset_data: AssetData,
    pub taker_asset_data: AssetData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Subscription {
    pub fn new(maker_asset_data: AssetData, taker_asset_data: AssetData) -> Self {
        Self {
            maker_asset_data,
            taker_asset_data,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriptions_cover_both_directions() {
        let pair = AssetPair::new("0xaa", "0xbb");
        let [forward, reverse] = pair.subscriptions();

        assert_eq!(forward.maker_asset_data.as_str(), "0xaa");
        assert_eq!(forward.taker_asset_data.as_str(), "0xbb");
        assert_eq!(reverse.maker_asset_data.as_str(), "0xbb");
        assert_eq!(reverse.taker_asset_data.as_str(), "0xaa");
    }

    #[test]
    fn subscription_omits_missing_limit() {
        let sub = Subscription::new("0xaa".into(), "0xbb".into());
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "makerAssetData": "0xaa", "takerAssetData": "0xbb" })
        );

        let limited = serde_json::to_value(sub.with_limit(50)).unwrap();
        assert_eq!(limited["limit"], 50);
    }

    #[test]
    fn parses_asset_pairs_item() {
        let raw = r#"{
            "assetDataA": {"assetData": "0xf47261b0aa", "minAmount": "0", "maxAmount": "115792089237316195423570985008687907853269984665640564039457584007913129639935", "precision": 18},
            "assetDataB": {"assetData": "0xf47261b0bb", "minAmount": "0", "maxAmount": "1000", "precision": 6}
        }"#;
        let pair: AssetPair = serde_json::from_str(raw).unwrap();
        assert_eq!(pair.base().as_str(), "0xf47261b0aa");
        assert_eq!(pair.asset_data_b.precision, Some(6));
        assert!(pair.contains(&AssetData::from("0xf47261b0bb")));
        assert!(!pair.contains(&AssetData::from("0xcc")));
    }
}
