//! Auto-mode mapping synthesis.
//!
//! Produces fully populated AssemblyScript handlers: each event handler
//! creates its entity under a collision-free id (transaction hash plus
//! log index), assigns every parameter in declaration order, assigns the
//! metadata trio last, saves, and finally instantiates any template the
//! event triggers.

use crate::config::model::ProjectConfig;
use crate::generate::plan::{
    ContractPlan, GenerationPlan, PlannedCall, PlannedEvent, PlannedInstantiation, TemplatePlan,
};
use crate::generate::{block_entity_name, block_handler_name, camel_case, event_handler_name, HandlerFile};

/// Render one mapping file per contract, then per template, in
/// declaration order.
pub fn render_all(config: &ProjectConfig, plan: &GenerationPlan) -> Vec<HandlerFile> {
    let mut files = Vec::new();
    for contract in &plan.contracts {
        files.push(HandlerFile {
            name: contract.name.clone(),
            content: render_contract(config, contract),
        });
    }
    for template in &plan.templates {
        files.push(HandlerFile {
            name: template.name.clone(),
            content: render_template(config, template),
        });
    }
    files
}

fn render_contract(config: &ProjectConfig, contract: &ContractPlan) -> String {
    let mut out = file_header(config, &contract.name);
    out.push_str(&render_imports(
        &contract.name,
        false,
        &contract.events,
        &contract.calls,
        contract.block_handler,
        &contract.instantiates,
    ));

    for event in &contract.events {
        out.push('\n');
        out.push_str(&render_event_handler(event, &contract.instantiates));
    }
    for call in &contract.calls {
        out.push('\n');
        out.push_str(&render_call_handler(call));
    }
    if contract.block_handler {
        out.push('\n');
        out.push_str(&render_block_handler(&contract.name));
    }
    out
}

fn render_template(config: &ProjectConfig, template: &TemplatePlan) -> String {
    let mut out = file_header(config, &template.name);
    out.push_str(&render_imports(
        &template.name,
        true,
        &template.events,
        &template.calls,
        template.block_handler,
        &[],
    ));

    for event in &template.events {
        out.push('\n');
        out.push_str(&render_event_handler(event, &[]));
    }
    for call in &template.calls {
        out.push('\n');
        out.push_str(&render_call_handler(call));
    }
    if template.block_handler {
        out.push('\n');
        out.push_str(&render_block_handler(&template.name));
    }
    out
}

pub(crate) fn file_header(config: &ProjectConfig, source: &str) -> String {
    format!(
        "// Mappings for {} ({} on {}).\n// Regenerate with subgraph-forge; edits here are overwritten.\n",
        source, config.name, config.network
    )
}

/// Import block shared by both generation modes.
pub(crate) fn render_imports(
    source: &str,
    is_template: bool,
    events: &[PlannedEvent],
    calls: &[PlannedCall],
    block_handler: bool,
    instantiates: &[PlannedInstantiation],
) -> String {
    let mut out = String::new();

    let module = if is_template {
        format!("../../generated/templates/{}/{}", source, source)
    } else {
        format!("../../generated/{}/{}", source, source)
    };

    let mut class_imports: Vec<String> = events
        .iter()
        .map(|e| format!("{} as {}Event", e.name, e.name))
        .collect();
    class_imports.extend(calls.iter().map(|c| c.entity.clone()));
    if !class_imports.is_empty() {
        out.push_str(&format!(
            "import {{ {} }} from \"{}\"\n",
            class_imports.join(", "),
            module
        ));
    }

    let mut entity_imports: Vec<String> = events.iter().map(|e| e.entity.clone()).collect();
    entity_imports.extend(
        calls
            .iter()
            .map(|c| format!("{} as {}Entity", c.entity, c.entity)),
    );
    if block_handler {
        entity_imports.push(block_entity_name(source));
    }
    if !entity_imports.is_empty() {
        out.push_str(&format!(
            "import {{ {} }} from \"../../generated/schema\"\n",
            entity_imports.join(", ")
        ));
    }

    if !instantiates.is_empty() {
        let mut names: Vec<&str> = instantiates.iter().map(|i| i.template.as_str()).collect();
        names.dedup();
        out.push_str(&format!(
            "import {{ {} }} from \"../../generated/templates\"\n",
            names.join(", ")
        ));
    }

    if block_handler {
        out.push_str("import { ethereum } from \"@graphprotocol/graph-ts\"\n");
    }

    out
}

fn render_event_handler(event: &PlannedEvent, instantiates: &[PlannedInstantiation]) -> String {
    let mut out = format!(
        "export function {}(event: {}Event): void {{\n",
        event_handler_name(&event.name),
        event.name
    );
    out.push_str(&format!(
        "  let entity = new {}(\n    event.transaction.hash.toHex() + \"-\" + event.logIndex.toString()\n  )\n",
        event.entity
    ));
    for param in &event.abi.params {
        out.push_str(&format!(
            "  entity.{} = event.params.{}\n",
            camel_case(&param.name),
            param.name
        ));
    }
    out.push('\n');
    out.push_str("  entity.blockNumber = event.block.number\n");
    out.push_str("  entity.blockTimestamp = event.block.timestamp\n");
    out.push_str("  entity.transactionHash = event.transaction.hash\n");
    out.push('\n');
    out.push_str("  entity.save()\n");

    for inst in instantiates {
        if inst.source_event == event.abi.name && inst.source_event == event.name {
            out.push('\n');
            out.push_str(&format!(
                "  {}.create(event.params.{})\n",
                inst.template, inst.address_param
            ));
        }
    }

    out.push_str("}\n");
    out
}

fn render_call_handler(call: &PlannedCall) -> String {
    let mut out = format!(
        "export function {}(call: {}): void {{\n",
        call.handler, call.entity
    );
    out.push_str(&format!(
        "  let entity = new {}Entity(\n    call.transaction.hash.toHex() + \"-\" + call.transaction.index.toString()\n  )\n",
        call.entity
    ));
    for input in &call.inputs {
        out.push_str(&format!(
            "  entity.{} = call.inputs.{}\n",
            camel_case(&input.name),
            input.name
        ));
    }
    out.push('\n');
    out.push_str("  entity.blockNumber = call.block.number\n");
    out.push_str("  entity.blockTimestamp = call.block.timestamp\n");
    out.push_str("  entity.transactionHash = call.transaction.hash\n");
    out.push('\n');
    out.push_str("  entity.save()\n}\n");
    out
}

fn render_block_handler(source: &str) -> String {
    let mut out = format!(
        "export function {}(block: ethereum.Block): void {{\n",
        block_handler_name(source)
    );
    out.push_str(&format!(
        "  let entity = new {}(block.hash.toHex())\n",
        block_entity_name(source)
    ));
    out.push_str("  entity.blockNumber = block.number\n");
    out.push_str("  entity.blockTimestamp = block.timestamp\n");
    out.push('\n');
    out.push_str("  entity.save()\n}\n");
    out
}
