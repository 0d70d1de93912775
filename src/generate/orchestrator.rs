//! Generation orchestration.
//!
//! Sequences validation and every synthesizer into a deterministic
//! artifact list. Stops at the first failure; callers receive either the
//! complete artifact set or nothing, so a failed run never leaves a
//! half-generated project behind.

use std::collections::BTreeMap;

use crate::abi::model::AbiModel;
use crate::config::model::{MappingsMode, ProjectConfig};
use crate::config::validation::{validate, validate_against_abis};
use crate::errors::ForgeError;
use crate::generate::plan::GenerationPlan;
use crate::generate::{manifest, mappings_auto, mappings_stub, package_json, readme, schema};
use crate::generate::Artifact;

/// Run the full pipeline: validate, plan, synthesize every artifact.
pub fn run(
    config: &ProjectConfig,
    abis: &BTreeMap<String, AbiModel>,
) -> Result<Vec<Artifact>, ForgeError> {
    validate(config)?;
    validate_against_abis(config, abis)?;

    let plan = GenerationPlan::build(config, abis);
    let mut artifacts = Vec::new();

    artifacts.push(Artifact::new(
        "subgraph.yaml",
        manifest::render_manifest(config, &plan),
    ));
    artifacts.push(Artifact::new(
        "schema.graphql",
        schema::render_schema(config, &plan)?,
    ));

    let handler_files = match config.mode() {
        MappingsMode::Auto => mappings_auto::render_all(config, &plan),
        MappingsMode::Stub => mappings_stub::render_all(config, &plan),
    };
    for file in handler_files {
        artifacts.push(Artifact::new(
            format!("src/mappings/{}.ts", file.name),
            file.content,
        ));
    }

    artifacts.push(Artifact::new(
        "package.json",
        package_json::render_package_json(config),
    ));
    artifacts.push(Artifact::new(
        "README.md",
        readme::render_readme(config, &plan),
    ));

    // Re-emit every resolved ABI so the manifest's references hold even
    // when the ABI came from an explorer rather than a local file.
    let mut seen_paths: Vec<&str> = Vec::new();
    for (name, abi_path) in config
        .contracts
        .iter()
        .map(|c| (&c.name, &c.abi_path))
        .chain(
            config
                .active_templates()
                .iter()
                .map(|t| (&t.name, &t.abi_path)),
        )
    {
        if seen_paths.contains(&abi_path.as_str()) {
            continue;
        }
        if let Some(abi) = abis.get(name) {
            seen_paths.push(abi_path.as_str());
            let content = serde_json::to_string_pretty(&abi.raw)
                .map_err(|e| ForgeError::ConfigShape(format!("could not serialize ABI: {}", e)))?;
            artifacts.push(Artifact::new(format!("abis/{}", abi_path), content));
        }
    }

    tracing::info!(
        artifacts = artifacts.len(),
        project = %config.name,
        "artifact synthesis complete"
    );
    Ok(artifacts)
}
