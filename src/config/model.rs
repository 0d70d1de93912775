//! Project configuration model.
//!
//! The persisted JSON document maps onto these types field-for-field.
//! Enum-like fields (`complexity`, `mappings_mode`) are stored in their
//! wire form and exposed through typed accessors; everything downstream
//! of validation works with the typed view.

use serde::{Deserialize, Serialize};

/// Configuration for a single statically declared contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Naming root for generated entities and handlers.
    pub name: String,
    /// Contract address, `0x` + 40 hex characters.
    pub address: String,
    pub start_block: u64,
    /// ABI filename, resolved relative to the project's `abis/` directory.
    pub abi_path: String,
    #[serde(default = "default_true")]
    pub index_events: bool,
    /// Function signatures to index, e.g. `transfer(address,uint256)`.
    /// Intermediate complexity and up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_handlers: Option<Vec<String>>,
    /// Intermediate complexity and up.
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_handler: bool,
}

/// A dynamic data source: a contract class whose instances are discovered
/// at indexing time when `source_event` fires on `source_contract`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    pub abi_path: String,
    /// Event names this template handles. Must be non-empty.
    pub event_handlers: Vec<String>,
    /// Name of the declared contract whose event instantiates this template.
    pub source_contract: String,
    /// Event on the source contract carrying the new instance's address.
    pub source_event: String,
    #[serde(default = "default_true")]
    pub index_events: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_handlers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_handler: bool,
}

/// A relationship edge between two generated entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRelationship {
    pub from_entity: String,
    pub to_entity: String,
    /// `one_to_one`, `one_to_many` or `many_to_many`.
    pub relation_type: String,
    /// Field added to the from-entity.
    pub field_name: String,
    /// When set, the field is virtual: resolved by reverse lookup through
    /// the named field on the target entity, never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

/// Root configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Schema generation: 1 = basic, 2 = adds call/block handlers,
    /// 3 = adds templates and relationships.
    #[serde(default = "default_version")]
    pub config_version: u32,
    pub name: String,
    pub network: String,
    pub output_dir: String,
    #[serde(default = "default_complexity")]
    pub complexity: String,
    pub mappings_mode: String,
    #[serde(default)]
    pub contracts: Vec<ContractConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_relationships: Vec<EntityRelationship>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

impl Complexity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(Self::Basic),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Lowest config version that may carry this tier's fields.
    pub fn min_config_version(&self) -> u32 {
        match self {
            Self::Basic => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingsMode {
    Stub,
    Auto,
}

impl MappingsMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stub" => Some(Self::Stub),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Auto => "auto",
        }
    }
}

impl ProjectConfig {
    /// Typed complexity. Falls back to basic for unvalidated input; the
    /// validator rejects unknown values before synthesis ever runs.
    pub fn tier(&self) -> Complexity {
        Complexity::parse(&self.complexity).unwrap_or(Complexity::Basic)
    }

    /// Typed mapping mode, same fallback contract as [`tier`](Self::tier).
    pub fn mode(&self) -> MappingsMode {
        MappingsMode::parse(&self.mappings_mode).unwrap_or(MappingsMode::Stub)
    }

    /// Stored version, bumped to the minimum the configured tier requires.
    pub fn effective_version(&self) -> u32 {
        self.config_version.max(self.tier().min_config_version())
    }

    pub fn contract(&self, name: &str) -> Option<&ContractConfig> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// Templates, empty unless the advanced tier is active.
    pub fn active_templates(&self) -> &[TemplateConfig] {
        if self.tier() == Complexity::Advanced {
            &self.templates
        } else {
            &[]
        }
    }

    /// Relationships, empty unless the advanced tier is active.
    pub fn active_relationships(&self) -> &[EntityRelationship] {
        if self.tier() == Complexity::Advanced {
            &self.entity_relationships
        } else {
            &[]
        }
    }
}

impl ContractConfig {
    /// Call handlers that are actually in effect for the given tier.
    pub fn active_call_handlers(&self, tier: Complexity) -> &[String] {
        if tier >= Complexity::Intermediate {
            self.call_handlers.as_deref().unwrap_or(&[])
        } else {
            &[]
        }
    }

    pub fn active_block_handler(&self, tier: Complexity) -> bool {
        tier >= Complexity::Intermediate && self.block_handler
    }
}

impl TemplateConfig {
    pub fn active_call_handlers(&self, tier: Complexity) -> &[String] {
        if tier >= Complexity::Intermediate {
            self.call_handlers.as_deref().unwrap_or(&[])
        } else {
            &[]
        }
    }

    pub fn active_block_handler(&self, tier: Complexity) -> bool {
        tier >= Complexity::Intermediate && self.block_handler
    }
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    1
}

fn default_complexity() -> String {
    "basic".to_string()
}

fn is_false(v: &bool) -> bool {
    !v
}
