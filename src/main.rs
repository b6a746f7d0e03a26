use clap::Parser;
use sra_relay::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Cat(args) => cli::cat::execute(args).await,
        Commands::Check(args) => cli::check::execute(args),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
