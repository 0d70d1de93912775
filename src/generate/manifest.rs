//! subgraph.yaml synthesis.
//!
//! Field names and nesting follow the indexing framework's manifest
//! schema exactly; the output must be buildable by `graph build` as-is.
//! Data sources and templates render in config declaration order; that
//! ordering keeps output reproducible and diffable.

use crate::config::model::ProjectConfig;
use crate::generate::plan::{ContractPlan, GenerationPlan, TemplatePlan};
use crate::generate::{block_entity_name, block_handler_name, event_handler_name};

const SPEC_VERSION: &str = "1.0.0";
const API_VERSION: &str = "0.0.7";

pub fn render_manifest(config: &ProjectConfig, plan: &GenerationPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!("specVersion: {}\n", SPEC_VERSION));
    out.push_str(&format!(
        "description: Generated subgraph for {} on {}\n",
        config.name, config.network
    ));
    out.push_str("schema:\n  file: ./schema.graphql\n");

    out.push_str("dataSources:\n");
    for contract in &plan.contracts {
        out.push_str(&render_data_source(config, contract));
    }

    if !plan.templates.is_empty() {
        out.push_str("templates:\n");
        for template in &plan.templates {
            out.push_str(&render_template(config, template));
        }
    }

    out
}

fn render_data_source(config: &ProjectConfig, contract: &ContractPlan) -> String {
    let mut out = String::new();
    out.push_str("  - kind: ethereum\n");
    out.push_str(&format!("    name: {}\n", contract.name));
    out.push_str(&format!("    network: {}\n", config.network));
    out.push_str("    source:\n");
    out.push_str(&format!("      address: \"{}\"\n", contract.address));
    out.push_str(&format!("      abi: {}\n", contract.name));
    out.push_str(&format!("      startBlock: {}\n", contract.start_block));
    out.push_str("    mapping:\n");
    out.push_str(&mapping_header());

    out.push_str(&render_entities(
        &entity_list(
            contract.events.iter().map(|e| e.entity.clone()),
            contract.calls.iter().map(|c| c.entity.clone()),
            contract.block_handler.then(|| block_entity_name(&contract.name)),
        ),
        "      ",
    ));

    out.push_str("      abis:\n");
    out.push_str(&format!(
        "        - name: {}\n          file: ./abis/{}\n",
        contract.name, contract.abi_path
    ));
    for (template_name, abi_path) in &contract.template_abis {
        out.push_str(&format!(
            "        - name: {}\n          file: ./abis/{}\n",
            template_name, abi_path
        ));
    }

    if !contract.events.is_empty() {
        out.push_str("      eventHandlers:\n");
        for event in &contract.events {
            out.push_str(&format!(
                "        - event: {}\n          handler: {}\n",
                event.abi.signature,
                event_handler_name(&event.name)
            ));
        }
    }
    if !contract.calls.is_empty() {
        out.push_str("      callHandlers:\n");
        for call in &contract.calls {
            out.push_str(&format!(
                "        - function: {}\n          handler: {}\n",
                call.configured, call.handler
            ));
        }
    }
    if contract.block_handler {
        out.push_str("      blockHandlers:\n");
        out.push_str(&format!(
            "        - handler: {}\n",
            block_handler_name(&contract.name)
        ));
    }

    out.push_str(&format!("      file: ./src/mappings/{}.ts\n", contract.name));
    out
}

fn render_template(config: &ProjectConfig, template: &TemplatePlan) -> String {
    let mut out = String::new();
    out.push_str("  - kind: ethereum\n");
    out.push_str(&format!("    name: {}\n", template.name));
    out.push_str(&format!("    network: {}\n", config.network));
    // no address or start block: instances are bound at indexing time
    out.push_str("    source:\n");
    out.push_str(&format!("      abi: {}\n", template.name));
    out.push_str("    mapping:\n");
    out.push_str(&mapping_header());

    out.push_str(&render_entities(
        &entity_list(
            template.events.iter().map(|e| e.entity.clone()),
            template.calls.iter().map(|c| c.entity.clone()),
            template.block_handler.then(|| block_entity_name(&template.name)),
        ),
        "      ",
    ));

    out.push_str("      abis:\n");
    out.push_str(&format!(
        "        - name: {}\n          file: ./abis/{}\n",
        template.name, template.abi_path
    ));

    if !template.events.is_empty() {
        out.push_str("      eventHandlers:\n");
        for event in &template.events {
            out.push_str(&format!(
                "        - event: {}\n          handler: {}\n",
                event.abi.signature,
                event_handler_name(&event.name)
            ));
        }
    }
    if !template.calls.is_empty() {
        out.push_str("      callHandlers:\n");
        for call in &template.calls {
            out.push_str(&format!(
                "        - function: {}\n          handler: {}\n",
                call.configured, call.handler
            ));
        }
    }
    if template.block_handler {
        out.push_str("      blockHandlers:\n");
        out.push_str(&format!(
            "        - handler: {}\n",
            block_handler_name(&template.name)
        ));
    }

    out.push_str(&format!("      file: ./src/mappings/{}.ts\n", template.name));
    out
}

fn mapping_header() -> String {
    format!(
        "      kind: ethereum/events\n      apiVersion: {}\n      language: wasm/assemblyscript\n",
        API_VERSION
    )
}

fn entity_list(
    events: impl Iterator<Item = String>,
    calls: impl Iterator<Item = String>,
    block: Option<String>,
) -> Vec<String> {
    let mut entities: Vec<String> = events.collect();
    for call in calls {
        if !entities.contains(&call) {
            entities.push(call);
        }
    }
    if let Some(block) = block {
        if !entities.contains(&block) {
            entities.push(block);
        }
    }
    entities
}

fn render_entities(entities: &[String], indent: &str) -> String {
    if entities.is_empty() {
        return format!("{}entities: []\n", indent);
    }
    let mut out = format!("{}entities:\n", indent);
    for entity in entities {
        out.push_str(&format!("{}  - {}\n", indent, entity));
    }
    out
}
