//! gcpswitch - Main entry point

use clap::Parser;
use log::{debug, info};

use gcpswitch::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting gcpswitch v{}", env!("CARGO_PKG_VERSION"));
    debug!("CLI args: {:?}", cli);

    // errors were already shown through the host
    if let Err(e) = gcpswitch::run(&cli).await {
        debug!("Exiting with error: {}", e);
        std::process::exit(1);
    }
}
