//! Loading ABIs from local JSON files.

use std::path::Path;

use serde_json::Value;

use crate::errors::{ForgeError, ValidationCode, ValidationError};

/// Load a raw ABI from a JSON file. The content must parse and be a JSON
/// array; deeper shape checks happen in [`crate::abi::model::AbiModel`].
pub fn load_abi_from_file(path: &Path) -> Result<Value, ForgeError> {
    if !path.exists() {
        return Err(ForgeError::AbiFetch(format!(
            "ABI file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(ForgeError::AbiFetch(format!(
            "ABI path is not a file: {}",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), "loading ABI from file");
    let content = std::fs::read_to_string(path)?;

    if content.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::AbiShape,
            "abi",
            format!("ABI file is empty: {}", path.display()),
        )
        .into());
    }

    let abi: Value = serde_json::from_str(&content).map_err(|e| {
        ValidationError::new(
            ValidationCode::AbiShape,
            "abi",
            format!("invalid JSON in ABI file {}: {}", path.display(), e),
        )
    })?;

    if !abi.is_array() {
        return Err(ValidationError::new(
            ValidationCode::AbiShape,
            "abi",
            format!("ABI must be a JSON array: {}", path.display()),
        )
        .into());
    }

    Ok(abi)
}
