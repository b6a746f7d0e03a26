//! Command-line interface definitions.

pub mod cat;
pub mod check;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{CloseBehavior, Config, LogFormat};
use crate::error::Result;
use crate::retry::Backoff;

/// Relay 0x Standard Relayer API order books to another relayer, a Mesh node, or stdout.
#[derive(Parser, Debug)]
#[command(name = "sra-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relay orders until interrupted
    Cat(RelayArgs),

    /// Validate the merged configuration and print a summary
    Check(RelayArgs),
}

/// Flags shared by `cat` and `check`. Each one overrides the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct RelayArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source SRA HTTP endpoint
    #[arg(short = 'e', long = "httpEndpoint", alias = "http-endpoint")]
    pub http_endpoint: Option<String>,

    /// Source SRA WebSocket endpoint
    #[arg(short = 'w', long = "wsEndpoint", alias = "ws-endpoint")]
    pub ws_endpoint: Option<String>,

    /// Only relay pairs containing this asset data
    #[arg(long = "assetDataA", alias = "asset-data-a")]
    pub asset_data_a: Option<String>,

    /// Only relay pairs containing this asset data
    #[arg(long = "assetDataB", alias = "asset-data-b")]
    pub asset_data_b: Option<String>,

    /// Only relay orders from this maker (case-insensitive)
    #[arg(long = "makerAddress", alias = "maker-address")]
    pub maker_address: Option<String>,

    /// Forward orders to this SRA endpoint
    #[arg(long = "toSRA", alias = "to-sra")]
    pub to_sra: Option<String>,

    /// Forward orders to this Mesh RPC endpoint
    #[arg(long = "toMesh", alias = "to-mesh")]
    pub to_mesh: Option<String>,

    /// Milliseconds between Mesh pushes; omit to push immediately
    #[arg(long = "pushDelay", alias = "push-delay")]
    pub push_delay: Option<u64>,

    /// Milliseconds between bootstrap batches and base retry interval
    #[arg(long = "pullDelay", alias = "pull-delay")]
    pub pull_delay: Option<u64>,

    /// Maximum attempts for pull-side requests
    #[arg(long = "pullRetries", alias = "pull-retries")]
    pub pull_retries: Option<u32>,

    /// Retry delay growth
    #[arg(long, value_enum)]
    pub backoff: Option<Backoff>,

    /// What to do when an orders channel closes
    #[arg(long = "onClose", alias = "on-close", value_enum)]
    pub on_close: Option<CloseBehavior>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

impl RelayArgs {
    /// Load the config file (if any), apply flags and validate.
    ///
    /// # Errors
    ///
    /// Returns a config error when the file cannot be read or parsed, or the
    /// merged result is invalid.
    #[allow(clippy::result_large_err)]
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.http_endpoint {
            config.source.http_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.ws_endpoint {
            config.source.ws_endpoint = endpoint.clone();
        }
        if let Some(asset) = &self.asset_data_a {
            config.filter.asset_data_a = Some(asset.clone());
        }
        if let Some(asset) = &self.asset_data_b {
            config.filter.asset_data_b = Some(asset.clone());
        }
        if let Some(maker) = &self.maker_address {
            config.filter.maker_address = Some(maker.clone());
        }
        if let Some(to_sra) = &self.to_sra {
            config.sink.to_sra = Some(to_sra.clone());
        }
        if let Some(to_mesh) = &self.to_mesh {
            config.sink.to_mesh = Some(to_mesh.clone());
        }
        if let Some(delay) = self.push_delay {
            config.sink.push_delay_ms = Some(delay);
        }
        if let Some(delay) = self.pull_delay {
            config.pull.delay_ms = delay;
        }
        if let Some(retries) = self.pull_retries {
            config.pull.retries = retries;
        }
        if let Some(backoff) = self.backoff {
            config.pull.backoff = backoff;
        }
        if let Some(on_close) = self.on_close {
            config.channel.on_close = on_close;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};

    fn parse(args: &[&str]) -> RelayArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Cat(args) | Commands::Check(args) => args,
        }
    }

    #[test]
    fn camel_case_flags_override_defaults() {
        let args = parse(&[
            "sra-relay",
            "cat",
            "-e",
            "http://localhost:3000/v3",
            "--toMesh",
            "ws://localhost:60557",
            "--pushDelay",
            "1000",
            "--makerAddress",
            "0xABC",
            "--backoff",
            "fixed",
            "--onClose",
            "exit",
        ]);
        let config = args.load_config().unwrap();

        assert_eq!(config.source.http_endpoint, "http://localhost:3000/v3");
        assert_eq!(config.sink.to_mesh.as_deref(), Some("ws://localhost:60557"));
        assert_eq!(config.sink.push_delay_ms, Some(1000));
        assert_eq!(config.filter.maker_address.as_deref(), Some("0xABC"));
        assert_eq!(config.pull.backoff, Backoff::Fixed);
        assert_eq!(config.channel.on_close, CloseBehavior::Exit);
    }

    #[test]
    fn kebab_aliases_are_accepted() {
        let args = parse(&["sra-relay", "check", "--asset-data-a", "0xaa", "--pull-retries", "3"]);

        assert_eq!(args.asset_data_a.as_deref(), Some("0xaa"));
        assert_eq!(args.pull_retries, Some(3));
    }

    #[test]
    fn both_destinations_fail_validation() {
        let args = parse(&[
            "sra-relay",
            "cat",
            "--toSRA",
            "https://other.relayer/v3",
            "--toMesh",
            "ws://localhost:60557",
        ]);

        assert!(matches!(
            args.load_config(),
            Err(Error::Config(ConfigError::InvalidValue { field: "to_mesh", .. }))
        ));
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = Config::from_toml_str("[pull]\ndelay_ms = 50\nretries = 7").unwrap();
        let args = RelayArgs {
            pull_delay: Some(200),
            json_logs: true,
            ..RelayArgs::default()
        };

        args.apply(&mut config);

        assert_eq!(config.pull.delay_ms, 200);
        assert_eq!(config.pull.retries, 7);
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
