//! Stub-mode mapping synthesis.
//!
//! Same file and function surface as auto mode, but handler bodies are
//! placeholders documenting each parameter's name, source type and
//! mapped type. Template instantiation is still emitted; it is wiring,
//! not entity logic, and without it a template would never activate.

use crate::config::model::ProjectConfig;
use crate::generate::mappings_auto::{file_header, render_imports};
use crate::generate::plan::{
    ContractPlan, GenerationPlan, PlannedCall, PlannedEvent, PlannedInstantiation, TemplatePlan,
};
use crate::generate::{block_handler_name, event_handler_name, HandlerFile};

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
        out.push_str(&render_event_stub(event, &contract.instantiates));
    }
    for call in &contract.calls {
        out.push('\n');
        out.push_str(&render_call_stub(call));
    }
    if contract.block_handler {
        out.push('\n');
        out.push_str(&render_block_stub(&contract.name));
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
        out.push_str(&render_event_stub(event, &[]));
    }
    for call in &template.calls {
        out.push('\n');
        out.push_str(&render_call_stub(call));
    }
    if template.block_handler {
        out.push('\n');
        out.push_str(&render_block_stub(&template.name));
    }
    out
}

fn render_event_stub(event: &PlannedEvent, instantiates: &[PlannedInstantiation]) -> String {
    let mut out = format!(
        "export function {}(event: {}Event): void {{\n",
        event_handler_name(&event.name),
        event.name
    );
    out.push_str(&format!(
        "  // TODO: create and persist a {} entity.\n",
        event.entity
    ));
    if event.abi.params.is_empty() {
        out.push_str("  // This event carries no parameters.\n");
    } else {
        out.push_str("  // Available parameters, in declaration order:\n");
        for param in &event.abi.params {
            out.push_str(&format!(
                "  //   event.params.{} ({} -> {})\n",
                param.name, param.sol_type, param.graph_type
            ));
        }
    }

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

fn render_call_stub(call: &PlannedCall) -> String {
    let mut out = format!(
        "export function {}(call: {}): void {{\n",
        call.handler, call.entity
    );
    out.push_str(&format!(
        "  // TODO: create and persist a {} entity.\n",
        call.entity
    ));
    if call.inputs.is_empty() {
        out.push_str("  // No matching ABI function; inspect call.inputs manually.\n");
    } else {
        out.push_str("  // Available inputs, in declaration order:\n");
        for input in &call.inputs {
            out.push_str(&format!(
                "  //   call.inputs.{} ({} -> {})\n",
                input.name, input.sol_type, input.graph_type
            ));
        }
    }
    out.push_str("}\n");
    out
}

fn render_block_stub(source: &str) -> String {
    format!(
        "export function {}(block: ethereum.Block): void {{\n  // TODO: handle block (block.number, block.timestamp, block.hash).\n}}\n",
        block_handler_name(source)
    )
}
