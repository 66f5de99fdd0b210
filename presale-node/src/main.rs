use clap::Parser;
use tracing_subscriber::EnvFilter;

use presale_node::config::NodeConfig;
use presale_node::{cli, format};

fn main() {
    let cli = cli::Cli::parse();

    // RUST_LOG wins; otherwise the level from the config file, if readable.
    let default_level = NodeConfig::load(&cli.config)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            format::print_error(&format!("failed to create Tokio runtime: {}", e));
            std::process::exit(1);
        }
    };
    rt.block_on(async {
        if let Err(e) = cli::run(cli).await {
            tracing::debug!(error = ?e, "command failed");
            format::print_error(&e.to_string());
            std::process::exit(1);
        }
    });
}
