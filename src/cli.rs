//! Command-line surface and the end-to-end run flow.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::abi::etherscan::ExplorerClient;
use crate::abi::source::{AbiProvider, AbiResolver, ExplorerAbiProvider, FileAbiProvider};
use crate::config::io::{load_config, save_config};
use crate::config::validation::validate;
use crate::errors::{ForgeError, ValidationCode, ValidationError};
use crate::generate::orchestrator;
use crate::networks;
use crate::writer::ProjectWriter;

#[derive(Parser, Debug)]
#[command(
    name = "subgraph-forge",
    version,
    about = "Generate buildable subgraph project scaffolds from a declarative contract config"
)]
pub struct Cli {
    /// Path to the project config JSON file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generate the subgraph project from the config
    #[arg(long)]
    pub generate: bool,

    /// Preview what would be generated without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Fetch missing ABIs from the network's block explorer
    #[arg(long)]
    pub fetch_abis: bool,
}

/// Load, validate, resolve ABIs, synthesize, write. With neither
/// `--generate` nor `--dry-run` the config is only validated.
pub async fn run_from_args(cli: Cli) -> Result<(), ForgeError> {
    let Some(config_path) = &cli.config else {
        return Err(ForgeError::ConfigShape(
            "no configuration file given; pass --config <path>".to_string(),
        ));
    };

    let config = load_config(config_path)?;
    validate(&config)?;
    tracing::info!(
        project = %config.name,
        network = %config.network,
        contracts = config.contracts.len(),
        "configuration valid"
    );

    if !cli.generate && !cli.dry_run {
        tracing::info!("validation only; pass --generate to produce the project");
        return Ok(());
    }

    let abis_dir = Path::new(&config.output_dir).join("abis");
    let mut providers: Vec<Box<dyn AbiProvider>> =
        vec![Box::new(FileAbiProvider::new(&abis_dir))];
    if cli.fetch_abis {
        let Some(descriptor) = networks::network(&config.network) else {
            return Err(ValidationError::new(
                ValidationCode::UnknownNetwork,
                "network",
                format!("unknown network '{}'", config.network),
            )
            .into());
        };
        providers.push(Box::new(ExplorerAbiProvider::new(
            ExplorerClient::for_network(descriptor)?,
        )));
    }

    let abis = AbiResolver::new(providers).resolve(&config).await?;
    let artifacts = orchestrator::run(&config, &abis)?;

    ProjectWriter::new(&config.output_dir, cli.dry_run).write_all(&artifacts)?;

    // Record the (normalized) config that produced the project, so the
    // scaffold can be regenerated without the original file.
    if !cli.dry_run {
        let saved = Path::new(&config.output_dir).join("subgraph-config.json");
        save_config(&config, &saved)?;
        tracing::info!(path = %saved.display(), "saved project configuration");
    }
    Ok(())
}
