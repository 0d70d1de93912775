//! Loading and saving the persisted project config.
//!
//! The document is checked for required keys before deserialization so
//! shape problems carry the missing field names instead of a serde trace.
//! Round-trip contract: `save(load(x)) == x` for any conforming document,
//! with documented defaults filled in on load.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::model::ProjectConfig;
use crate::errors::ForgeError;

const REQUIRED_FIELDS: &[&str] = &["name", "network", "output_dir", "mappings_mode"];
const REQUIRED_CONTRACT_FIELDS: &[&str] = &["name", "address", "start_block", "abi_path"];

/// Load a [`ProjectConfig`] from a JSON file.
///
/// Fields introduced by a later config version than the document declares
/// are reset to their defaults rather than rejected: a version-1 document
/// never carries call/block handlers, a version-2 document never carries
/// templates or relationships.
pub fn load_config(path: &Path) -> Result<ProjectConfig, ForgeError> {
    if !path.exists() {
        return Err(ForgeError::ConfigShape(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(ForgeError::ConfigShape(format!(
            "configuration path is not a file: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&content)
        .map_err(|e| ForgeError::ConfigShape(format!("invalid JSON in configuration file: {}", e)))?;

    check_required_keys(&data)?;

    let mut config: ProjectConfig = serde_json::from_value(data)
        .map_err(|e| ForgeError::ConfigShape(format!("malformed configuration: {}", e)))?;

    apply_version_defaults(&mut config);
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Save a [`ProjectConfig`] as pretty-printed JSON, bumping the stored
/// version to the minimum the configured complexity requires.
pub fn save_config(config: &ProjectConfig, path: &Path) -> Result<(), ForgeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut to_write = config.clone();
    to_write.config_version = config.effective_version();

    let content = serde_json::to_string_pretty(&to_write)
        .map_err(|e| ForgeError::ConfigShape(format!("could not serialize configuration: {}", e)))?;
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "saved configuration");
    Ok(())
}

fn check_required_keys(data: &Value) -> Result<(), ForgeError> {
    let obj = data.as_object().ok_or_else(|| {
        ForgeError::ConfigShape("configuration must be a JSON object".to_string())
    })?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !obj.contains_key(**f))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(ForgeError::ConfigShape(format!(
            "configuration is missing required fields: {}",
            missing.join(", ")
        )));
    }

    if let Some(contracts) = obj.get("contracts") {
        let list = contracts.as_array().ok_or_else(|| {
            ForgeError::ConfigShape("'contracts' field must be a list".to_string())
        })?;
        for (i, contract) in list.iter().enumerate() {
            let contract_obj = contract.as_object().ok_or_else(|| {
                ForgeError::ConfigShape(format!("contract at index {} must be an object", i))
            })?;
            let missing: Vec<&str> = REQUIRED_CONTRACT_FIELDS
                .iter()
                .filter(|f| !contract_obj.contains_key(**f))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(ForgeError::ConfigShape(format!(
                    "contract at index {} is missing required fields: {}",
                    i,
                    missing.join(", ")
                )));
            }
        }
    }

    Ok(())
}

/// Reset fields above the document's declared version to their defaults.
fn apply_version_defaults(config: &mut ProjectConfig) {
    if config.config_version < 2 {
        let mut stripped = false;
        for contract in &mut config.contracts {
            stripped |= contract.call_handlers.take().is_some();
            stripped |= std::mem::take(&mut contract.block_handler);
        }
        if stripped {
            tracing::warn!(
                version = config.config_version,
                "version-1 config carried call/block handler fields; resetting them"
            );
        }
    }
    if config.config_version < 3 {
        if !config.templates.is_empty() || !config.entity_relationships.is_empty() {
            tracing::warn!(
                version = config.config_version,
                "config below version 3 carried templates or relationships; resetting them"
            );
        }
        config.templates.clear();
        config.entity_relationships.clear();
    }
}
