//! Asset pair discovery and the operator's pair filter.

use tracing::info;

use crate::domain::{AssetData, AssetPair};
use crate::error::Result;
use crate::port::OrderBookSource;
use crate::retry::{self, RetryPolicy};

/// Narrows discovered pairs to those containing the configured assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPairFilter {
    pub a: Option<AssetData>,
    pub b: Option<AssetData>,
}

impl AssetPairFilter {
    pub fn new(a: Option<AssetData>, b: Option<AssetData>) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none()
    }

    #[must_use]
    pub fn matches(&self, pair: &AssetPair) -> bool {
        match (&self.a, &self.b) {
            (Some(a), Some(b)) => pair.contains(a) && pair.contains(b),
            (Some(x), None) | (None, Some(x)) => pair.contains(x),
            (None, None) => true,
        }
    }

    /// Keep matching pairs, preserving their order.
    #[must_use]
    pub fn apply(&self, pairs: Vec<AssetPair>) -> Vec<AssetPair> {
        if self.is_empty() {
            return pairs;
        }
        pairs.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Fetch the first page of pairs and apply `filter`.
///
/// # Errors
///
/// Returns the retry executor's error when the listing cannot be fetched.
pub async fn discover(
    source: &dyn OrderBookSource,
    filter: &AssetPairFilter,
    per_page: u32,
    policy: &RetryPolicy,
) -> Result<Vec<AssetPair>> {
    let pairs = retry::attempt(policy, "asset_pairs", || source.asset_pairs(per_page)).await?;
    let discovered = pairs.len();
    let pairs = filter.apply(pairs);

    info!(discovered, retained = pairs.len(), "Asset pairs discovered");
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::domain::pair;
    use crate::testkit::source::StaticSource;
    use std::time::Duration;

    fn pairs() -> Vec<AssetPair> {
        vec![
            pair("0xweth", "0xdai"),
            pair("0xzrx", "0xweth"),
            pair("0xzrx", "0xdai"),
            pair("0xmkr", "0xusdc"),
        ]
    }

    fn names(pairs: &[AssetPair]) -> Vec<String> {
        pairs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_identifier_matches_either_side() {
        let only_a = AssetPairFilter::new(Some("0xweth".into()), None);
        let only_b = AssetPairFilter::new(None, Some("0xweth".into()));

        let expected = vec!["0xweth/0xdai", "0xzrx/0xweth"];
        assert_eq!(names(&only_a.apply(pairs())), expected);
        assert_eq!(names(&only_b.apply(pairs())), expected);
    }

    #[test]
    fn both_identifiers_must_appear_in_any_position() {
        let filter = AssetPairFilter::new(Some("0xdai".into()), Some("0xzrx".into()));
        assert_eq!(names(&filter.apply(pairs())), vec!["0xzrx/0xdai"]);
    }

    #[test]
    fn no_filter_keeps_everything() {
        assert_eq!(AssetPairFilter::default().apply(pairs()), pairs());
    }

    #[tokio::test(start_paused = true)]
    async fn discover_retries_listing() {
        let source = StaticSource::new(pairs()).failing_asset_pairs(2);
        let filter = AssetPairFilter::new(Some("0xusdc".into()), None);

        let found = discover(&source, &filter, 500, &RetryPolicy::new(Duration::from_millis(10), 5))
            .await
            .unwrap();

        assert_eq!(names(&found), vec!["0xmkr/0xusdc"]);
        assert_eq!(source.asset_pairs_calls(), 3);
        assert_eq!(source.last_per_page(), Some(500));
    }

    #[tokio::test(start_paused = true)]
    async fn discover_surfaces_exhaustion() {
        let source = StaticSource::new(pairs()).failing_asset_pairs(10);

        let err = discover(
            &source,
            &AssetPairFilter::default(),
            500,
            &RetryPolicy::new(Duration::from_millis(10), 2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::RetryExhausted { attempts: 2, .. }));
    }
}
