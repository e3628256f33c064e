use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use medbase::cli::{Cli, Command};
use medbase::commands;
use medbase::config::{self, ServiceConfig};
use medbase::store::RestStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins; --debug only raises the fallback filter.
    let fallback = match &cli.command {
        Command::Api(args) if args.debug => config::debug_log_filter(),
        _ => config::default_log_filter(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();

    let store = Arc::new(RestStore::new(&ServiceConfig::from_env()));
    match commands::run(cli.command, store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
