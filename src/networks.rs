//! Supported network metadata.
//!
//! Static registry mapping network identifiers to their explorer endpoint
//! and chain parameters. Built once, read-only for the process lifetime.

/// Metadata for one supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    /// Network identifier as it appears in configs and manifests.
    pub name: &'static str,
    /// Etherscan-compatible explorer API host.
    pub explorer_host: &'static str,
    pub chain_id: Option<u64>,
    pub default_start_block: Option<u64>,
    /// Environment variable holding the explorer API key, if any.
    pub api_key_env_var: Option<&'static str>,
}

pub const SUPPORTED_NETWORKS: &[NetworkDescriptor] = &[
    NetworkDescriptor {
        name: "ethereum",
        explorer_host: "api.etherscan.io",
        chain_id: Some(1),
        default_start_block: Some(0),
        api_key_env_var: Some("ETHERSCAN_API_KEY"),
    },
    NetworkDescriptor {
        name: "optimism",
        explorer_host: "api-optimistic.etherscan.io",
        chain_id: Some(10),
        default_start_block: Some(0),
        api_key_env_var: Some("OPTIMISM_ETHERSCAN_API_KEY"),
    },
    NetworkDescriptor {
        name: "arbitrum",
        explorer_host: "api.arbiscan.io",
        chain_id: Some(42161),
        default_start_block: Some(0),
        api_key_env_var: Some("ARBITRUM_ETHERSCAN_API_KEY"),
    },
];

/// Look up a network by identifier.
pub fn network(name: &str) -> Option<&'static NetworkDescriptor> {
    SUPPORTED_NETWORKS.iter().find(|n| n.name == name)
}

/// Supported identifiers in declaration order, for error messages.
pub fn network_names() -> Vec<&'static str> {
    SUPPORTED_NETWORKS.iter().map(|n| n.name).collect()
}
