//! Relay configuration loading and validation.
//!
//! Configuration comes from an optional TOML file; every section and field
//! has a default, and command-line flags are applied on top before
//! validation.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::AssetData;
use crate::error::{ConfigError, Result};
use crate::relay::{AssetPairFilter, BootstrapSettings, ClosePolicy};
use crate::retry::{Backoff, RetryPolicy};

mod logging;

pub use logging::{LogFormat, LoggingConfig};

pub const DEFAULT_HTTP_ENDPOINT: &str = "https://api.radarrelay.com/0x/v3";
pub const DEFAULT_WS_ENDPOINT: &str = "wss://ws.radarrelay.com/0x/v3";

/// Where orders are pulled from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub http_endpoint: String,
    pub ws_endpoint: String,
    /// Size of the single asset pair page requested at startup.
    pub asset_pairs_per_page: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            http_endpoint: DEFAULT_HTTP_ENDPOINT.into(),
            ws_endpoint: DEFAULT_WS_ENDPOINT.into(),
            asset_pairs_per_page: 500,
        }
    }
}

/// Optional narrowing of pairs and makers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub asset_data_a: Option<String>,
    pub asset_data_b: Option<String>,
    pub maker_address: Option<String>,
}

/// Where orders go. Console output when neither destination is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub to_sra: Option<String>,
    pub to_mesh: Option<String>,
    /// Mesh flush interval; unset pushes every batch immediately.
    pub push_delay_ms: Option<u64>,
    pub push_retries: u32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            to_sra: None,
            to_mesh: None,
            push_delay_ms: None,
            push_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Pull-side pacing and retry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PullConfig {
    pub delay_ms: u64,
    pub retries: u32,
    pub backoff: Backoff,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            delay_ms: RetryPolicy::DEFAULT_INTERVAL.as_millis() as u64,
            retries: RetryPolicy::DEFAULT_MAX_RETRIES,
            backoff: Backoff::default(),
        }
    }
}

/// Reaction to an orders channel closing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CloseBehavior {
    #[default]
    Reconnect,
    /// Stop the process with a non-zero status.
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub on_close: CloseBehavior,
    pub reconnect_delay_ms: u64,
    /// Pairs sharing one WebSocket connection.
    pub subscription_group_size: usize,
    /// Order books fetched concurrently during bootstrap.
    pub bootstrap_batch_size: usize,
    /// Books with this many orders or fewer are not relayed.
    pub min_orderbook_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            on_close: CloseBehavior::default(),
            reconnect_delay_ms: ClosePolicy::DEFAULT_RECONNECT_DELAY.as_millis() as u64,
            subscription_group_size: 100,
            bootstrap_batch_size: BootstrapSettings::DEFAULT_BATCH_SIZE,
            min_orderbook_size: BootstrapSettings::DEFAULT_MIN_ORDERBOOK_SIZE,
        }
    }
}

/// Main relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub sink: SinkConfig,
    pub pull: PullConfig,
    pub channel: ChannelConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Read a TOML file. The result is not validated yet.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&content)
    }

    #[allow(clippy::result_large_err)]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Check the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        check_url(&self.source.http_endpoint, "http_endpoint", HTTP_SCHEMES)?;
        check_url(&self.source.ws_endpoint, "ws_endpoint", WS_SCHEMES)?;

        if self.sink.to_sra.is_some() && self.sink.to_mesh.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "to_mesh",
                reason: "to_sra and to_mesh are mutually exclusive".into(),
            }
            .into());
        }
        if let Some(to_sra) = &self.sink.to_sra {
            check_url(to_sra, "to_sra", HTTP_SCHEMES)?;
        }
        if let Some(to_mesh) = &self.sink.to_mesh {
            check_url(to_mesh, "to_mesh", MESH_SCHEMES)?;
        }

        at_least_one(self.source.asset_pairs_per_page as u64, "asset_pairs_per_page")?;
        at_least_one(self.pull.retries as u64, "retries")?;
        at_least_one(self.sink.push_retries as u64, "push_retries")?;
        at_least_one(self.channel.subscription_group_size as u64, "subscription_group_size")?;
        at_least_one(self.channel.bootstrap_batch_size as u64, "bootstrap_batch_size")?;
        if let Some(delay) = self.sink.push_delay_ms {
            at_least_one(delay, "push_delay_ms")?;
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Retry policy for listing pairs and fetching order books.
    #[must_use]
    pub fn pull_policy(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(self.pull.delay_ms), self.pull.retries)
            .with_backoff(self.pull.backoff)
    }

    /// Retry policy for SRA submissions and Mesh pushes.
    #[must_use]
    pub fn push_policy(&self) -> RetryPolicy {
        RetryPolicy::new(RetryPolicy::DEFAULT_INTERVAL, self.sink.push_retries)
            .with_backoff(self.pull.backoff)
    }

    #[must_use]
    pub fn push_delay(&self) -> Option<Duration> {
        self.sink.push_delay_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn close_policy(&self) -> ClosePolicy {
        match self.channel.on_close {
            CloseBehavior::Reconnect => ClosePolicy::Reconnect {
                delay: Duration::from_millis(self.channel.reconnect_delay_ms),
            },
            CloseBehavior::Exit => ClosePolicy::Exit,
        }
    }

    #[must_use]
    pub fn bootstrap_settings(&self) -> BootstrapSettings {
        BootstrapSettings {
            batch_size: self.channel.bootstrap_batch_size,
            min_orderbook_size: self.channel.min_orderbook_size,
            pacing: Duration::from_millis(self.pull.delay_ms),
            pull: self.pull_policy(),
        }
    }

    #[must_use]
    pub fn pair_filter(&self) -> AssetPairFilter {
        AssetPairFilter::new(
            self.filter.asset_data_a.as_deref().map(AssetData::from),
            self.filter.asset_data_b.as_deref().map(AssetData::from),
        )
    }
}

const HTTP_SCHEMES: &[&str] = &["http", "https"];
const WS_SCHEMES: &[&str] = &["ws", "wss"];
const MESH_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

#[allow(clippy::result_large_err)]
fn check_url(value: &str, field: &'static str, schemes: &[&str]) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme '{}', expected one of {schemes:?}", url.scheme()),
        }
        .into());
    }
    Ok(())
}

#[allow(clippy::result_large_err)]
fn at_least_one(value: u64, field: &'static str) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be at least 1".into(),
        }
        .into());
    }
    Ok(())
}
