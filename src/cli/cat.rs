//! Handler for the `cat` command.

use tokio::signal;
use tracing::info;

use crate::cli::RelayArgs;
use crate::error::Result;
use crate::relay;

/// Run the relay until it fails or Ctrl-C is pressed.
pub async fn execute(args: &RelayArgs) -> Result<()> {
    let config = args.load_config()?;
    config.init_logging();

    info!(
        http_endpoint = %config.source.http_endpoint,
        ws_endpoint = %config.source.ws_endpoint,
        "sra-relay starting"
    );

    tokio::select! {
        result = relay::run(&config) => result?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("sra-relay stopped");
    Ok(())
}
