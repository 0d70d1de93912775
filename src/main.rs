mod abi;
mod cli;
mod config;
mod errors;
mod generate;
mod networks;
mod writer;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Cli::parse();
    if let Err(e) = cli::run_from_args(args).await {
        if debug_enabled() {
            return Err(e.into());
        }
        tracing::error!("{}", single_line(&e));
        tracing::info!("set DEBUG=1 for full detail");
        std::process::exit(1);
    }
    Ok(())
}

fn debug_enabled() -> bool {
    std::env::var("DEBUG")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Collapse an error into the single sanitized line the CLI prints.
fn single_line(e: &errors::ForgeError) -> String {
    e.to_string().replace('\n', " ")
}
