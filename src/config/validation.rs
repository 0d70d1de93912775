//! Config validation.
//!
//! [`validate`] is a pure function of the config value and the static
//! network registry: no I/O, no mutation, checks run in a fixed order so
//! identical bad input always reports the same first violation.
//!
//! [`validate_against_abis`] is the second, ABI-aware pass the
//! orchestrator runs once ABIs are resolved; it covers the
//! cross-references a config-only pass cannot see.

use std::collections::{BTreeMap, HashSet};

use alloy::primitives::Address;

use crate::abi::model::AbiModel;
use crate::config::model::{Complexity, MappingsMode, ProjectConfig, TemplateConfig};
use crate::errors::{ValidationCode, ValidationError};
use crate::networks;

const SUPPORTED_CONFIG_VERSIONS: &[u32] = &[1, 2, 3];
const VALID_RELATION_TYPES: &[&str] = &["one_to_one", "one_to_many", "many_to_many"];

/// Validate a [`ProjectConfig`], reporting the first violated invariant.
pub fn validate(config: &ProjectConfig) -> Result<(), ValidationError> {
    check_top_level(config)?;
    check_network(config)?;
    check_contracts(config)?;
    check_mappings_mode(config)?;
    check_complexity(config)?;
    check_tier_gating(config)?;
    check_cross_references(config)?;
    Ok(())
}

fn check_top_level(config: &ProjectConfig) -> Result<(), ValidationError> {
    if !SUPPORTED_CONFIG_VERSIONS.contains(&config.config_version) {
        return Err(ValidationError::new(
            ValidationCode::UnsupportedVersion,
            "config_version",
            format!(
                "unsupported config_version {}; supported: 1, 2, 3",
                config.config_version
            ),
        ));
    }
    if config.name.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            "name",
            "project name cannot be empty",
        ));
    }
    if config.output_dir.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            "output_dir",
            "output directory cannot be empty",
        ));
    }
    if config.contracts.is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            "contracts",
            "at least one contract must be specified",
        ));
    }
    Ok(())
}

fn check_network(config: &ProjectConfig) -> Result<(), ValidationError> {
    if networks::network(&config.network).is_none() {
        return Err(ValidationError::new(
            ValidationCode::UnknownNetwork,
            "network",
            format!(
                "unknown network '{}'; supported: {}",
                config.network,
                networks::network_names().join(", ")
            ),
        ));
    }
    Ok(())
}

fn check_contracts(config: &ProjectConfig) -> Result<(), ValidationError> {
    for (i, contract) in config.contracts.iter().enumerate() {
        if contract.name.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationCode::MissingField,
                format!("contracts[{}].name", i),
                "contract name cannot be empty",
            ));
        }
        if !is_canonical_address(&contract.address) {
            return Err(ValidationError::new(
                ValidationCode::InvalidAddress,
                format!("contracts[{}].address", i),
                format!(
                    "invalid address '{}'; must be '0x' followed by 40 hexadecimal characters",
                    contract.address
                ),
            ));
        }
        if contract.abi_path.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationCode::MissingField,
                format!("contracts[{}].abi_path", i),
                "ABI path cannot be empty",
            ));
        }
    }

    let mut seen_names = HashSet::new();
    for (i, contract) in config.contracts.iter().enumerate() {
        if !seen_names.insert(contract.name.as_str()) {
            return Err(ValidationError::new(
                ValidationCode::DuplicateName,
                format!("contracts[{}].name", i),
                format!("duplicate contract name '{}'", contract.name),
            ));
        }
    }

    let mut seen_addresses = HashSet::new();
    for (i, contract) in config.contracts.iter().enumerate() {
        if !seen_addresses.insert(contract.address.to_ascii_lowercase()) {
            return Err(ValidationError::new(
                ValidationCode::DuplicateAddress,
                format!("contracts[{}].address", i),
                format!("duplicate contract address '{}'", contract.address),
            ));
        }
    }

    Ok(())
}

fn check_mappings_mode(config: &ProjectConfig) -> Result<(), ValidationError> {
    if MappingsMode::parse(&config.mappings_mode).is_none() {
        return Err(ValidationError::new(
            ValidationCode::InvalidMappingsMode,
            "mappings_mode",
            format!(
                "invalid mappings_mode '{}'; must be 'stub' or 'auto'",
                config.mappings_mode
            ),
        ));
    }
    Ok(())
}

fn check_complexity(config: &ProjectConfig) -> Result<(), ValidationError> {
    let Some(tier) = Complexity::parse(&config.complexity) else {
        return Err(ValidationError::new(
            ValidationCode::InvalidComplexity,
            "complexity",
            format!(
                "invalid complexity '{}'; must be 'basic', 'intermediate' or 'advanced'",
                config.complexity
            ),
        ));
    };
    if config.config_version < tier.min_config_version() {
        return Err(ValidationError::new(
            ValidationCode::VersionTooLow,
            "config_version",
            format!(
                "complexity '{}' requires config_version >= {}, got {}",
                tier.as_str(),
                tier.min_config_version(),
                config.config_version
            ),
        ));
    }
    Ok(())
}

fn check_tier_gating(config: &ProjectConfig) -> Result<(), ValidationError> {
    let tier = config.tier();

    for (i, contract) in config.contracts.iter().enumerate() {
        if let Some(handlers) = &contract.call_handlers {
            if !handlers.is_empty() && tier < Complexity::Intermediate {
                return Err(ValidationError::new(
                    ValidationCode::TierViolation,
                    format!("contracts[{}].call_handlers", i),
                    "call handlers require complexity 'intermediate' or higher",
                ));
            }
            for (j, sig) in handlers.iter().enumerate() {
                check_call_signature(sig, &format!("contracts[{}].call_handlers[{}]", i, j))?;
            }
        }
        if contract.block_handler && tier < Complexity::Intermediate {
            return Err(ValidationError::new(
                ValidationCode::TierViolation,
                format!("contracts[{}].block_handler", i),
                "block handlers require complexity 'intermediate' or higher",
            ));
        }
    }

    if !config.templates.is_empty() && tier < Complexity::Advanced {
        return Err(ValidationError::new(
            ValidationCode::TierViolation,
            "templates",
            "templates require complexity 'advanced'",
        ));
    }
    if !config.entity_relationships.is_empty() && tier < Complexity::Advanced {
        return Err(ValidationError::new(
            ValidationCode::TierViolation,
            "entity_relationships",
            "entity relationships require complexity 'advanced'",
        ));
    }

    Ok(())
}

fn check_cross_references(config: &ProjectConfig) -> Result<(), ValidationError> {
    let contract_names: HashSet<&str> =
        config.contracts.iter().map(|c| c.name.as_str()).collect();

    let mut seen_template_names = HashSet::new();
    for (i, template) in config.templates.iter().enumerate() {
        check_template(template, i, &contract_names)?;
        if contract_names.contains(template.name.as_str()) {
            return Err(ValidationError::new(
                ValidationCode::DuplicateName,
                format!("templates[{}].name", i),
                format!("template name '{}' collides with a contract name", template.name),
            ));
        }
        if !seen_template_names.insert(template.name.as_str()) {
            return Err(ValidationError::new(
                ValidationCode::DuplicateName,
                format!("templates[{}].name", i),
                format!("duplicate template name '{}'", template.name),
            ));
        }
    }

    for (i, rel) in config.entity_relationships.iter().enumerate() {
        let path = |field: &str| format!("entity_relationships[{}].{}", i, field);
        if rel.from_entity.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationCode::MissingField,
                path("from_entity"),
                "from_entity cannot be empty",
            ));
        }
        if rel.to_entity.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationCode::MissingField,
                path("to_entity"),
                "to_entity cannot be empty",
            ));
        }
        if rel.field_name.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationCode::MissingField,
                path("field_name"),
                "field_name cannot be empty",
            ));
        }
        if !VALID_RELATION_TYPES.contains(&rel.relation_type.as_str()) {
            return Err(ValidationError::new(
                ValidationCode::InvalidRelationType,
                path("relation_type"),
                format!(
                    "invalid relation_type '{}'; must be one of: {}",
                    rel.relation_type,
                    VALID_RELATION_TYPES.join(", ")
                ),
            ));
        }
    }

    Ok(())
}

fn check_template(
    template: &TemplateConfig,
    i: usize,
    contract_names: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let path = |field: &str| format!("templates[{}].{}", i, field);

    if template.name.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            path("name"),
            "template name cannot be empty",
        ));
    }
    if template.abi_path.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            path("abi_path"),
            "ABI path cannot be empty",
        ));
    }
    if template.event_handlers.is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            path("event_handlers"),
            "template must handle at least one event",
        ));
    }
    for (j, handler) in template.event_handlers.iter().enumerate() {
        if handler.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationCode::MissingField,
                format!("templates[{}].event_handlers[{}]", i, j),
                "event handler name cannot be empty",
            ));
        }
    }
    if !contract_names.contains(template.source_contract.as_str()) {
        return Err(ValidationError::new(
            ValidationCode::CrossReference,
            path("source_contract"),
            format!(
                "template '{}' references unknown source contract '{}'",
                template.name, template.source_contract
            ),
        ));
    }
    if template.source_event.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::MissingField,
            path("source_event"),
            "source event cannot be empty",
        ));
    }
    if let Some(handlers) = &template.call_handlers {
        for (j, sig) in handlers.iter().enumerate() {
            check_call_signature(sig, &format!("templates[{}].call_handlers[{}]", i, j))?;
        }
    }
    Ok(())
}

fn check_call_signature(sig: &str, path: &str) -> Result<(), ValidationError> {
    let valid = sig
        .find('(')
        .map(|open| !sig[..open].trim().is_empty() && sig[open..].contains(')'))
        .unwrap_or(false);
    if !valid {
        return Err(ValidationError::new(
            ValidationCode::InvalidCallHandler,
            path,
            format!(
                "invalid call handler signature '{}'; expected functionName(type1,type2,...)",
                sig
            ),
        ));
    }
    Ok(())
}

fn is_canonical_address(s: &str) -> bool {
    s.starts_with("0x") && s.parse::<Address>().is_ok()
}

/// Cross-checks that need resolved ABIs: a template's `source_event` must
/// be an event its source contract actually defines, and that event must
/// carry an address-typed parameter to extract the instance address from.
/// Contracts whose ABI could not be resolved are skipped; the placeholder
/// path has nothing to check against.
pub fn validate_against_abis(
    config: &ProjectConfig,
    abis: &BTreeMap<String, AbiModel>,
) -> Result<(), ValidationError> {
    for (i, template) in config.active_templates().iter().enumerate() {
        let Some(abi) = abis.get(&template.source_contract) else {
            continue;
        };
        let Some(event) = abi.event(&template.source_event) else {
            return Err(ValidationError::new(
                ValidationCode::CrossReference,
                format!("templates[{}].source_event", i),
                format!(
                    "source contract '{}' defines no event named '{}'",
                    template.source_contract, template.source_event
                ),
            ));
        };
        if instantiation_address_param(event).is_none() {
            return Err(ValidationError::new(
                ValidationCode::NoAddressParam,
                format!("templates[{}].source_event", i),
                format!(
                    "event '{}' has no address-typed parameter to instantiate template '{}' from",
                    template.source_event, template.name
                ),
            ));
        }
    }
    Ok(())
}

/// Address-extraction rule for template instantiation: the first
/// non-indexed address parameter (factories index the parent keys and
/// carry the created address in data), falling back to the first address
/// parameter of any kind.
pub fn instantiation_address_param(event: &crate::abi::model::EventAbi) -> Option<&str> {
    event
        .params
        .iter()
        .find(|p| p.sol_type == "address" && !p.indexed)
        .or_else(|| event.params.iter().find(|p| p.sol_type == "address"))
        .map(|p| p.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{ContractConfig, EntityRelationship};

    fn contract(name: &str, address: &str) -> ContractConfig {
        ContractConfig {
            name: name.to_string(),
            address: address.to_string(),
            start_block: 100,
            abi_path: format!("{}.json", name),
            index_events: true,
            call_handlers: None,
            block_handler: false,
        }
    }

    fn basic_config() -> ProjectConfig {
        ProjectConfig {
            config_version: 1,
            name: "test-subgraph".to_string(),
            network: "ethereum".to_string(),
            output_dir: "./generated".to_string(),
            complexity: "basic".to_string(),
            mappings_mode: "auto".to_string(),
            contracts: vec![contract(
                "TestToken",
                "0x6B175474E89094C44Da98b954EedeAC495271d0F",
            )],
            templates: Vec::new(),
            entity_relationships: Vec::new(),
        }
    }

    fn pair_template() -> TemplateConfig {
        TemplateConfig {
            name: "Pair".to_string(),
            abi_path: "Pair.json".to_string(),
            event_handlers: vec!["Swap".to_string(), "Sync".to_string()],
            source_contract: "TestToken".to_string(),
            source_event: "PairCreated".to_string(),
            index_events: true,
            call_handlers: None,
            block_handler: false,
        }
    }

    #[test]
    fn test_valid_basic_config_passes() {
        validate(&basic_config()).unwrap();
    }

    #[test]
    fn test_validate_is_idempotent() {
        let config = basic_config();
        let first = validate(&config);
        let second = validate(&config);
        assert_eq!(first, second);

        let mut bad = basic_config();
        bad.network = "goerli".to_string();
        assert_eq!(validate(&bad), validate(&bad));
    }

    #[test]
    fn test_unsupported_version() {
        let mut config = basic_config();
        config.config_version = 7;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::UnsupportedVersion);
        assert_eq!(err.path, "config_version");
    }

    #[test]
    fn test_empty_name() {
        let mut config = basic_config();
        config.name = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::MissingField);
        assert_eq!(err.path, "name");
    }

    #[test]
    fn test_unknown_network() {
        let mut config = basic_config();
        config.network = "goerli".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::UnknownNetwork);
        assert!(err.message.contains("ethereum"));
    }

    #[test]
    fn test_no_contracts() {
        let mut config = basic_config();
        config.contracts.clear();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.path, "contracts");
    }

    #[test]
    fn test_bad_addresses() {
        for bad in [
            "6B175474E89094C44Da98b954EedeAC495271d0F", // no prefix
            "0x6B175474",                               // too short
            "0x6B175474E89094C44Da98b954EedeAC495271d0Fff", // too long
            "0xZZ175474E89094C44Da98b954EedeAC495271d0F", // not hex
            "",
        ] {
            let mut config = basic_config();
            config.contracts[0].address = bad.to_string();
            let err = validate(&config).unwrap_err();
            assert_eq!(err.code, ValidationCode::InvalidAddress, "address: {}", bad);
            assert_eq!(err.path, "contracts[0].address");
        }
    }

    #[test]
    fn test_address_case_insensitive() {
        let mut config = basic_config();
        config.contracts[0].address =
            "0x6b175474e89094c44da98b954eedeac495271d0f".to_string();
        validate(&config).unwrap();
    }

    #[test]
    fn test_duplicate_contract_names() {
        let mut config = basic_config();
        config.contracts.push(contract(
            "TestToken",
            "0x1111111111111111111111111111111111111111",
        ));
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::DuplicateName);
        assert_eq!(err.path, "contracts[1].name");
    }

    #[test]
    fn test_duplicate_addresses_case_insensitive() {
        let mut config = basic_config();
        let mut second = contract("Other", "0x6b175474e89094c44da98b954eedeac495271d0f");
        second.abi_path = "Other.json".to_string();
        config.contracts.push(second);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::DuplicateAddress);
    }

    #[test]
    fn test_invalid_mappings_mode() {
        let mut config = basic_config();
        config.mappings_mode = "magic".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::InvalidMappingsMode);
    }

    #[test]
    fn test_invalid_complexity() {
        let mut config = basic_config();
        config.complexity = "extreme".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::InvalidComplexity);
    }

    #[test]
    fn test_complexity_requires_version() {
        let mut config = basic_config();
        config.complexity = "intermediate".to_string();
        config.config_version = 1;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::VersionTooLow);

        config.config_version = 2;
        validate(&config).unwrap();
    }

    #[test]
    fn test_call_handlers_gated_by_tier() {
        let mut config = basic_config();
        config.contracts[0].call_handlers =
            Some(vec!["transfer(address,uint256)".to_string()]);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::TierViolation);
        assert_eq!(err.path, "contracts[0].call_handlers");

        config.complexity = "intermediate".to_string();
        config.config_version = 2;
        validate(&config).unwrap();
    }

    #[test]
    fn test_block_handler_gated_by_tier() {
        let mut config = basic_config();
        config.contracts[0].block_handler = true;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::TierViolation);
    }

    #[test]
    fn test_bad_call_signature() {
        let mut config = basic_config();
        config.complexity = "intermediate".to_string();
        config.config_version = 2;
        config.contracts[0].call_handlers = Some(vec!["transfer".to_string()]);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::InvalidCallHandler);
        assert_eq!(err.path, "contracts[0].call_handlers[0]");
    }

    #[test]
    fn test_templates_gated_by_tier() {
        let mut config = basic_config();
        config.config_version = 3;
        config.templates.push(pair_template());
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::TierViolation);
        assert_eq!(err.path, "templates");
    }

    #[test]
    fn test_template_unknown_source_contract() {
        let mut config = basic_config();
        config.complexity = "advanced".to_string();
        config.config_version = 3;
        let mut template = pair_template();
        template.source_contract = "Ghost".to_string();
        config.templates.push(template);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::CrossReference);
        assert_eq!(err.path, "templates[0].source_contract");
    }

    #[test]
    fn test_template_name_collides_with_contract() {
        let mut config = basic_config();
        config.complexity = "advanced".to_string();
        config.config_version = 3;
        let mut template = pair_template();
        template.name = "TestToken".to_string();
        config.templates.push(template);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::DuplicateName);
    }

    #[test]
    fn test_template_without_event_handlers() {
        let mut config = basic_config();
        config.complexity = "advanced".to_string();
        config.config_version = 3;
        let mut template = pair_template();
        template.event_handlers.clear();
        config.templates.push(template);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.path, "templates[0].event_handlers");
    }

    #[test]
    fn test_relationship_invalid_type() {
        let mut config = basic_config();
        config.complexity = "advanced".to_string();
        config.config_version = 3;
        config.templates.push(pair_template());
        config.entity_relationships.push(EntityRelationship {
            from_entity: "Pair".to_string(),
            to_entity: "Swap".to_string(),
            relation_type: "one_to_some".to_string(),
            field_name: "swaps".to_string(),
            derived_from: None,
        });
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code, ValidationCode::InvalidRelationType);
    }

    #[test]
    fn test_advanced_config_passes() {
        let mut config = basic_config();
        config.complexity = "advanced".to_string();
        config.config_version = 3;
        config.templates.push(pair_template());
        validate(&config).unwrap();
    }

    mod abi_pass {
        use super::*;
        use serde_json::json;

        fn factory_abi() -> AbiModel {
            AbiModel::normalize(&json!([
                {
                    "type": "event",
                    "name": "PairCreated",
                    "inputs": [
                        {"name": "token0", "type": "address", "indexed": true},
                        {"name": "token1", "type": "address", "indexed": true},
                        {"name": "pair", "type": "address", "indexed": false},
                        {"name": "pairId", "type": "uint256", "indexed": false}
                    ]
                }
            ]))
            .unwrap()
        }

        fn advanced_config() -> ProjectConfig {
            let mut config = basic_config();
            config.complexity = "advanced".to_string();
            config.config_version = 3;
            config.templates.push(pair_template());
            config
        }

        #[test]
        fn test_source_event_must_exist() {
            let config = advanced_config();
            let mut abis = BTreeMap::new();
            abis.insert("TestToken".to_string(), factory_abi());

            validate_against_abis(&config, &abis).unwrap();

            let mut bad = config.clone();
            bad.templates[0].source_event = "PoolCreated".to_string();
            let err = validate_against_abis(&bad, &abis).unwrap_err();
            assert_eq!(err.code, ValidationCode::CrossReference);
            assert_eq!(err.path, "templates[0].source_event");
        }

        #[test]
        fn test_source_event_needs_address_param() {
            let mut config = advanced_config();
            config.templates[0].source_event = "Sync".to_string();
            let abi = AbiModel::normalize(&json!([
                {
                    "type": "event",
                    "name": "Sync",
                    "inputs": [
                        {"name": "reserve0", "type": "uint112", "indexed": false}
                    ]
                }
            ]))
            .unwrap();
            let mut abis = BTreeMap::new();
            abis.insert("TestToken".to_string(), abi);

            let err = validate_against_abis(&config, &abis).unwrap_err();
            assert_eq!(err.code, ValidationCode::NoAddressParam);
        }

        #[test]
        fn test_missing_abi_is_skipped() {
            let config = advanced_config();
            validate_against_abis(&config, &BTreeMap::new()).unwrap();
        }

        #[test]
        fn test_address_param_prefers_non_indexed() {
            let abi = factory_abi();
            let event = abi.event("PairCreated").unwrap();
            assert_eq!(instantiation_address_param(event), Some("pair"));
        }

        #[test]
        fn test_address_param_falls_back_to_indexed() {
            let abi = AbiModel::normalize(&json!([
                {
                    "type": "event",
                    "name": "PoolCreated",
                    "inputs": [
                        {"name": "pool", "type": "address", "indexed": true},
                        {"name": "fee", "type": "uint24", "indexed": false}
                    ]
                }
            ]))
            .unwrap();
            let event = abi.event("PoolCreated").unwrap();
            assert_eq!(instantiation_address_param(event), Some("pool"));
        }
    }
}
