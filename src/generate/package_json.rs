//! package.json synthesis for the generated project.

use crate::config::model::ProjectConfig;

const GRAPH_CLI_VERSION: &str = "0.71.0";
const GRAPH_TS_VERSION: &str = "0.32.0";

pub fn render_package_json(config: &ProjectConfig) -> String {
    let name = sanitize_package_name(&config.name);
    format!(
        r#"{{
  "name": "{name}",
  "version": "0.1.0",
  "description": "Subgraph for {project} on {network}",
  "scripts": {{
    "codegen": "graph codegen",
    "build": "graph build",
    "deploy": "graph deploy --node https://api.thegraph.com/deploy/ {name}",
    "create-local": "graph create --node http://localhost:8020/ {name}",
    "remove-local": "graph remove --node http://localhost:8020/ {name}",
    "deploy-local": "graph deploy --node http://localhost:8020/ --ipfs http://localhost:5001 {name}"
  }},
  "dependencies": {{
    "@graphprotocol/graph-cli": "{cli}",
    "@graphprotocol/graph-ts": "{ts}"
  }}
}}
"#,
        name = name,
        project = config.name,
        network = config.network,
        cli = GRAPH_CLI_VERSION,
        ts = GRAPH_TS_VERSION,
    )
}

/// Sanitize a project name into a valid npm package name: lowercase,
/// separators collapsed to hyphens, anything else dropped.
pub fn sanitize_package_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    let trimmed = replaced.trim_start_matches('-');
    if trimmed.is_empty() {
        "subgraph".to_string()
    } else {
        trimmed.to_string()
    }
}
