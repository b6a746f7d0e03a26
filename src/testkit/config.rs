//! Canonical test configurations.
//!
//! Single source of truth for configs used across tests, with delays short
//! enough to run under paused time without long waits.

use crate::config::{CloseBehavior, Config};

/// Defaults with 10ms pull delay, 3 retries and a 1s reconnect delay.
pub fn fast() -> Config {
    let mut config = Config::default();
    config.pull.delay_ms = 10;
    config.pull.retries = 3;
    config.sink.push_retries = 3;
    config.channel.reconnect_delay_ms = 1000;
    config
}

/// [`fast`] with the legacy exit-on-close policy.
pub fn exit_on_close() -> Config {
    let mut config = fast();
    config.channel.on_close = CloseBehavior::Exit;
    config
}
