//! ABI acquisition.
//!
//! Providers are tried in order for each contract or template; the first
//! one that produces an ABI wins. A request that no provider can satisfy
//! is not an error; generation proceeds on the placeholder path for
//! that source.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::abi::etherscan::ExplorerClient;
use crate::abi::local::load_abi_from_file;
use crate::abi::model::AbiModel;
use crate::config::model::ProjectConfig;
use crate::errors::ForgeError;

/// One ABI lookup: the source's name, its configured ABI filename, and
/// the contract address when the source has one (templates do not).
pub struct AbiRequest<'a> {
    pub name: &'a str,
    pub abi_path: &'a str,
    pub address: Option<&'a str>,
}

/// A single way of obtaining a raw ABI. `Ok(None)` means "not available
/// here, ask the next provider"; errors abort the run.
#[async_trait]
pub trait AbiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(&self, request: &AbiRequest<'_>) -> Result<Option<Value>, ForgeError>;
}

/// Reads `<abis_dir>/<abi_path>`. An absent file defers to the next
/// provider; a present-but-malformed file is an error.
pub struct FileAbiProvider {
    abis_dir: PathBuf,
}

impl FileAbiProvider {
    pub fn new(abis_dir: impl Into<PathBuf>) -> Self {
        Self {
            abis_dir: abis_dir.into(),
        }
    }
}

#[async_trait]
impl AbiProvider for FileAbiProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, request: &AbiRequest<'_>) -> Result<Option<Value>, ForgeError> {
        let path = self.abis_dir.join(request.abi_path);
        if !path.exists() {
            tracing::debug!(name = request.name, path = %path.display(), "no local ABI file");
            return Ok(None);
        }
        load_abi_from_file(&path).map(Some)
    }
}

/// Fetches verified ABIs from the network's block explorer. Sources
/// without an address (templates) defer; fetch failures abort so a typo'd
/// address never silently downgrades to the placeholder path.
pub struct ExplorerAbiProvider {
    client: ExplorerClient,
}

impl ExplorerAbiProvider {
    pub fn new(client: ExplorerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AbiProvider for ExplorerAbiProvider {
    fn name(&self) -> &'static str {
        "explorer"
    }

    async fn load(&self, request: &AbiRequest<'_>) -> Result<Option<Value>, ForgeError> {
        let Some(address) = request.address else {
            tracing::debug!(name = request.name, "no address to fetch ABI for");
            return Ok(None);
        };
        self.client.fetch_abi(address).await.map(Some)
    }
}

/// Chains providers and normalizes every resolved ABI.
pub struct AbiResolver {
    providers: Vec<Box<dyn AbiProvider>>,
}

impl AbiResolver {
    pub fn new(providers: Vec<Box<dyn AbiProvider>>) -> Self {
        Self { providers }
    }

    /// Resolve ABIs for every contract and active template in the config.
    /// Sources no provider could satisfy are simply absent from the map.
    pub async fn resolve(
        &self,
        config: &ProjectConfig,
    ) -> Result<BTreeMap<String, AbiModel>, ForgeError> {
        let mut requests: Vec<AbiRequest<'_>> = config
            .contracts
            .iter()
            .map(|c| AbiRequest {
                name: &c.name,
                abi_path: &c.abi_path,
                address: Some(&c.address),
            })
            .collect();
        for template in config.active_templates() {
            requests.push(AbiRequest {
                name: &template.name,
                abi_path: &template.abi_path,
                address: None,
            });
        }

        let mut abis = BTreeMap::new();
        for request in &requests {
            match self.resolve_one(request).await? {
                Some(raw) => {
                    let model = AbiModel::normalize(&raw)
                        .map_err(|e| e.nested_under(request.name))?;
                    abis.insert(request.name.to_string(), model);
                }
                None => {
                    tracing::warn!(
                        name = request.name,
                        abi_path = request.abi_path,
                        "no ABI available; falling back to placeholder generation"
                    );
                }
            }
        }
        Ok(abis)
    }

    async fn resolve_one(&self, request: &AbiRequest<'_>) -> Result<Option<Value>, ForgeError> {
        for provider in &self.providers {
            if let Some(raw) = provider.load(request).await? {
                tracing::info!(
                    name = request.name,
                    provider = provider.name(),
                    "resolved ABI"
                );
                return Ok(Some(raw));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ContractConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn config_with(contracts: Vec<ContractConfig>) -> ProjectConfig {
        ProjectConfig {
            config_version: 1,
            name: "test".to_string(),
            network: "ethereum".to_string(),
            output_dir: "./out".to_string(),
            complexity: "basic".to_string(),
            mappings_mode: "auto".to_string(),
            contracts,
            templates: Vec::new(),
            entity_relationships: Vec::new(),
        }
    }

    fn token_contract() -> ContractConfig {
        ContractConfig {
            name: "Token".to_string(),
            address: "0x1111111111111111111111111111111111111111".to_string(),
            start_block: 0,
            abi_path: "Token.json".to_string(),
            index_events: true,
            call_handlers: None,
            block_handler: false,
        }
    }

    #[tokio::test]
    async fn test_file_provider_resolves() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Token.json"),
            r#"[{"type": "event", "name": "Transfer", "inputs": []}]"#,
        )
        .unwrap();

        let resolver = AbiResolver::new(vec![Box::new(FileAbiProvider::new(dir.path()))]);
        let abis = resolver
            .resolve(&config_with(vec![token_contract()]))
            .await
            .unwrap();

        assert!(abis.contains_key("Token"));
        assert_eq!(abis["Token"].events.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_abi_is_absent_not_error() {
        let dir = TempDir::new().unwrap();
        let resolver = AbiResolver::new(vec![Box::new(FileAbiProvider::new(dir.path()))]);
        let abis = resolver
            .resolve(&config_with(vec![token_contract()]))
            .await
            .unwrap();
        assert!(abis.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_local_abi_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Token.json"), "{oops").unwrap();

        let resolver = AbiResolver::new(vec![Box::new(FileAbiProvider::new(dir.path()))]);
        let err = resolver
            .resolve(&config_with(vec![token_contract()]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_shape_error_names_the_contract() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Token.json"),
            json!([{"type": "event", "inputs": []}]).to_string(),
        )
        .unwrap();

        let resolver = AbiResolver::new(vec![Box::new(FileAbiProvider::new(dir.path()))]);
        let err = resolver
            .resolve(&config_with(vec![token_contract()]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Token.abi[0].name"));
    }
}
