//! Handler for the `check` command.

use crate::cli::RelayArgs;
use crate::config::Config;
use crate::error::Result;

/// Validate the merged configuration without connecting to anything.
#[allow(clippy::result_large_err)]
pub fn execute(args: &RelayArgs) -> Result<()> {
    if let Some(path) = &args.config {
        println!("Checking configuration: {}", path.display());
    } else {
        println!("Checking configuration: defaults and flags");
    }
    println!();

    let config = args.load_config()?;
    println!("✓ Configuration is valid");
    println!();
    print_summary(&config);
    Ok(())
}

fn print_summary(config: &Config) {
    println!("Summary:");
    println!("  Source HTTP: {}", config.source.http_endpoint);
    println!("  Source WS: {}", config.source.ws_endpoint);
    println!("  Destination: {}", destination(config));
    if let Some(delay) = config.sink.push_delay_ms {
        println!("  Mesh push delay: {delay}ms");
    }

    let filter = &config.filter;
    println!(
        "  Asset filter: {}",
        match (&filter.asset_data_a, &filter.asset_data_b) {
            (Some(a), Some(b)) => format!("{a} and {b}"),
            (Some(x), None) | (None, Some(x)) => x.clone(),
            (None, None) => "none".into(),
        }
    );
    println!(
        "  Maker filter: {}",
        filter.maker_address.as_deref().unwrap_or("none")
    );

    let pull = config.pull_policy();
    println!(
        "  Pull: {}ms delay, {} retries, {:?} backoff",
        pull.interval.as_millis(),
        pull.max_retries,
        pull.backoff
    );
    println!("  On close: {:?}", config.channel.on_close);
}

fn destination(config: &Config) -> String {
    match (&config.sink.to_sra, &config.sink.to_mesh) {
        (Some(sra), _) => format!("SRA {sra}"),
        (None, Some(mesh)) => format!("Mesh {mesh}"),
        (None, None) => "stdout".into(),
    }
}
