//! GraphQL schema synthesis.
//!
//! One entity per indexed event, plus call and block entities for the
//! intermediate tier so every entity the manifest names actually exists
//! in the schema. Relationship declarations add reference fields; a
//! relationship that points at nothing is an error, never a silent drop.

use crate::config::model::{MappingsMode, ProjectConfig};
use crate::errors::{ValidationCode, ValidationError};
use crate::generate::plan::{GenerationPlan, PlannedCall, PlannedEvent};
use crate::generate::{block_entity_name, camel_case};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    /// GraphQL type including nullability markers, e.g. `BigInt!`.
    pub field_type: String,
    /// When set the field is virtual, resolved by reverse lookup through
    /// this field on the target entity.
    pub derived_from: Option<String>,
}

impl FieldDecl {
    fn required(name: impl Into<String>, scalar: &str) -> Self {
        Self {
            name: name.into(),
            field_type: format!("{}!", scalar),
            derived_from: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// Derive all entity declarations: contract events, call and block
/// entities, template events, then relationship fields.
pub fn synthesize_entities(
    config: &ProjectConfig,
    plan: &GenerationPlan,
) -> Result<Vec<EntityDecl>, ValidationError> {
    let mut entities = Vec::new();

    for contract in &plan.contracts {
        for event in &contract.events {
            entities.push(event_entity(event));
        }
        for call in &contract.calls {
            entities.push(call_entity(call));
        }
        if contract.block_handler {
            entities.push(block_entity(&contract.name));
        }
    }
    for template in &plan.templates {
        for event in &template.events {
            entities.push(event_entity(event));
        }
        for call in &template.calls {
            entities.push(call_entity(call));
        }
        if template.block_handler {
            entities.push(block_entity(&template.name));
        }
    }

    apply_relationships(config, &mut entities)?;
    Ok(entities)
}

/// Render the complete `schema.graphql`.
pub fn render_schema(
    config: &ProjectConfig,
    plan: &GenerationPlan,
) -> Result<String, ValidationError> {
    let entities = synthesize_entities(config, plan)?;
    let mode = config.mode();

    let mut out = String::new();
    out.push_str(&format!(
        "# Entities for {} on {}.\n# Run `graph codegen` after changing this file.\n",
        config.name, config.network
    ));

    for entity in &entities {
        out.push('\n');
        out.push_str(&render_entity(entity, mode));
    }
    Ok(out)
}

fn event_entity(event: &PlannedEvent) -> EntityDecl {
    let mut fields = Vec::with_capacity(event.abi.params.len() + 3);
    for param in &event.abi.params {
        fields.push(FieldDecl::required(
            camel_case(&param.name),
            &param.graph_type,
        ));
    }
    append_metadata_fields(&mut fields);
    EntityDecl {
        name: event.entity.clone(),
        fields,
    }
}

fn call_entity(call: &PlannedCall) -> EntityDecl {
    let mut fields = Vec::with_capacity(call.inputs.len() + 3);
    for input in &call.inputs {
        fields.push(FieldDecl::required(
            camel_case(&input.name),
            &input.graph_type,
        ));
    }
    append_metadata_fields(&mut fields);
    EntityDecl {
        name: call.entity.clone(),
        fields,
    }
}

fn block_entity(source: &str) -> EntityDecl {
    EntityDecl {
        name: block_entity_name(source),
        fields: vec![
            FieldDecl::required("blockNumber", "BigInt"),
            FieldDecl::required("blockTimestamp", "BigInt"),
        ],
    }
}

/// Fixed metadata trio, always appended last and in this order.
fn append_metadata_fields(fields: &mut Vec<FieldDecl>) {
    fields.push(FieldDecl::required("blockNumber", "BigInt"));
    fields.push(FieldDecl::required("blockTimestamp", "BigInt"));
    fields.push(FieldDecl::required("transactionHash", "Bytes"));
}

fn apply_relationships(
    config: &ProjectConfig,
    entities: &mut [EntityDecl],
) -> Result<(), ValidationError> {
    let relationships = config.active_relationships();

    for (i, rel) in relationships.iter().enumerate() {
        if !entities.iter().any(|e| e.name == rel.to_entity) {
            return Err(ValidationError::new(
                ValidationCode::CrossReference,
                format!("entity_relationships[{}].to_entity", i),
                format!("no generated entity named '{}'", rel.to_entity),
            ));
        }

        let field_type = match rel.relation_type.as_str() {
            "one_to_one" => rel.to_entity.clone(),
            _ => format!("[{}!]!", rel.to_entity),
        };

        let from = entities
            .iter_mut()
            .find(|e| e.name == rel.from_entity)
            .ok_or_else(|| {
                ValidationError::new(
                    ValidationCode::CrossReference,
                    format!("entity_relationships[{}].from_entity", i),
                    format!("no generated entity named '{}'", rel.from_entity),
                )
            })?;

        from.fields.push(FieldDecl {
            name: rel.field_name.clone(),
            field_type,
            derived_from: rel.derived_from.clone(),
        });
    }

    // Derived fields resolve against the target after every relationship
    // has added its physical fields, so forward references work.
    for (i, rel) in relationships.iter().enumerate() {
        let Some(derived_from) = &rel.derived_from else {
            continue;
        };
        let Some(target) = entities.iter().find(|e| e.name == rel.to_entity) else {
            continue;
        };
        if !target.fields.iter().any(|f| &f.name == derived_from) {
            return Err(ValidationError::new(
                ValidationCode::DerivedFieldMissing,
                format!("entity_relationships[{}].derived_from", i),
                format!(
                    "entity '{}' has no field '{}' to derive '{}.{}' from",
                    rel.to_entity, derived_from, rel.from_entity, rel.field_name
                ),
            ));
        }
    }

    Ok(())
}

fn render_entity(entity: &EntityDecl, mode: MappingsMode) -> String {
    let mut out = format!("type {} @entity {{\n  id: ID!\n", entity.name);
    for field in &entity.fields {
        let line = match &field.derived_from {
            Some(derived) => format!(
                "{}: {} @derivedFrom(field: \"{}\")",
                field.name, field.field_type, derived
            ),
            None => format!("{}: {}", field.name, field.field_type),
        };
        match mode {
            MappingsMode::Auto => out.push_str(&format!("  {}\n", line)),
            // Stub mode persists only the identity field; the rest stays
            // as documentation for whoever fills the handlers in.
            MappingsMode::Stub => out.push_str(&format!("  # {}\n", line)),
        }
    }
    out.push_str("}\n");
    out
}
