//! Generation planning.
//!
//! The plan resolves every naming and wiring decision once (which events
//! each source indexes, overload-unique handler names, cross-source
//! entity disambiguation, call-handler matching, template instantiation
//! wiring) so the manifest, schema and mapping renderers all work from
//! the same answers.

use std::collections::{BTreeMap, HashMap};

use crate::abi::model::{AbiModel, AbiParam, EventAbi};
use crate::config::model::ProjectConfig;
use crate::config::validation::instantiation_address_param;
use crate::generate::{call_entity_name, call_handler_name};

/// One event a source will index.
#[derive(Debug, Clone)]
pub struct PlannedEvent {
    pub abi: EventAbi,
    /// Overload-unique local name; handler is `handle<name>`, the
    /// generated event class is `<name>` in the contract module.
    pub name: String,
    /// Entity name, prefixed with the source name when the same event
    /// name is declared by more than one source in the project.
    pub entity: String,
}

/// One configured call handler.
#[derive(Debug, Clone)]
pub struct PlannedCall {
    /// Signature exactly as configured; the manifest echoes this.
    pub configured: String,
    pub function_name: String,
    pub handler: String,
    pub entity: String,
    /// Inputs of the matching ABI function; empty when the ABI defines
    /// no such function (the handler still generates, inputs undocumented).
    pub inputs: Vec<AbiParam>,
}

/// Template instantiation wired into a source contract's event handler.
#[derive(Debug, Clone)]
pub struct PlannedInstantiation {
    pub template: String,
    /// ABI name of the triggering event on the source contract.
    pub source_event: String,
    /// Event parameter carrying the new instance's address.
    pub address_param: String,
}

#[derive(Debug, Clone)]
pub struct ContractPlan {
    pub name: String,
    pub address: String,
    pub start_block: u64,
    pub abi_path: String,
    pub events: Vec<PlannedEvent>,
    /// True when no ABI resolved and the `<Name>Event` placeholder stands
    /// in for real events.
    pub placeholder: bool,
    pub calls: Vec<PlannedCall>,
    pub block_handler: bool,
    pub instantiates: Vec<PlannedInstantiation>,
    /// Template ABIs this contract's mapping needs for instantiation,
    /// as (template name, abi path) pairs.
    pub template_abis: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct TemplatePlan {
    pub name: String,
    pub abi_path: String,
    pub events: Vec<PlannedEvent>,
    pub placeholder: bool,
    pub calls: Vec<PlannedCall>,
    pub block_handler: bool,
}

#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub contracts: Vec<ContractPlan>,
    pub templates: Vec<TemplatePlan>,
}

impl GenerationPlan {
    /// Build the plan. Assumes the config passed [`validate`] and
    /// [`validate_against_abis`]; anything those passes cannot see
    /// degrades with a warning rather than failing here.
    ///
    /// [`validate`]: crate::config::validation::validate
    /// [`validate_against_abis`]: crate::config::validation::validate_against_abis
    pub fn build(config: &ProjectConfig, abis: &BTreeMap<String, AbiModel>) -> Self {
        let tier = config.tier();

        let mut contracts = Vec::new();
        for contract in &config.contracts {
            let abi = abis.get(&contract.name);

            // Events required as instantiation triggers are indexed even
            // when the contract itself opts out of event indexing.
            let forced_events: Vec<&str> = config
                .active_templates()
                .iter()
                .filter(|t| t.source_contract == contract.name)
                .map(|t| t.source_event.as_str())
                .collect();

            let (events, placeholder) = match abi {
                Some(abi) => {
                    let selected: Vec<&EventAbi> = abi
                        .events
                        .iter()
                        .filter(|e| {
                            contract.index_events || forced_events.contains(&e.name.as_str())
                        })
                        .collect();
                    (plan_events(selected), false)
                }
                None if contract.index_events => (vec![placeholder_event(&contract.name)], true),
                None => (Vec::new(), true),
            };

            let calls = plan_calls(contract.active_call_handlers(tier), abi, &contract.name);

            let mut instantiates = Vec::new();
            let mut template_abis = Vec::new();
            for template in config.active_templates() {
                if template.source_contract != contract.name {
                    continue;
                }
                template_abis.push((template.name.clone(), template.abi_path.clone()));
                match abi.and_then(|a| a.event(&template.source_event)) {
                    Some(event) => match instantiation_address_param(event) {
                        Some(param) => instantiates.push(PlannedInstantiation {
                            template: template.name.clone(),
                            source_event: template.source_event.clone(),
                            address_param: param.to_string(),
                        }),
                        None => tracing::warn!(
                            template = %template.name,
                            event = %template.source_event,
                            "source event has no address parameter; instantiation not wired"
                        ),
                    },
                    None => tracing::warn!(
                        template = %template.name,
                        contract = %contract.name,
                        "no ABI for the source contract; template instantiation not wired"
                    ),
                }
            }

            contracts.push(ContractPlan {
                name: contract.name.clone(),
                address: contract.address.clone(),
                start_block: contract.start_block,
                abi_path: contract.abi_path.clone(),
                events,
                placeholder,
                calls,
                block_handler: contract.active_block_handler(tier),
                instantiates,
                template_abis,
            });
        }

        let mut templates = Vec::new();
        for template in config.active_templates() {
            let abi = abis.get(&template.name);
            let (events, placeholder) = match abi {
                Some(abi) => {
                    let selected: Vec<&EventAbi> = abi
                        .events
                        .iter()
                        .filter(|e| template.event_handlers.contains(&e.name))
                        .collect();
                    if selected.is_empty() {
                        tracing::warn!(
                            template = %template.name,
                            "no ABI events match the configured event handlers"
                        );
                        (plan_named_placeholders(&template.event_handlers), true)
                    } else {
                        (plan_events(selected), false)
                    }
                }
                None => (plan_named_placeholders(&template.event_handlers), true),
            };

            let calls = plan_calls(template.active_call_handlers(tier), abi, &template.name);

            templates.push(TemplatePlan {
                name: template.name.clone(),
                abi_path: template.abi_path.clone(),
                events,
                placeholder,
                calls,
                block_handler: template.active_block_handler(tier),
            });
        }

        let mut plan = Self {
            contracts,
            templates,
        };
        plan.disambiguate_entities();
        plan
    }

    /// Prefix entity names with their source name wherever the same event
    /// name is produced by more than one source. Applied uniformly: every
    /// colliding source gets the prefix, not just latecomers.
    fn disambiguate_entities(&mut self) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for event in self.all_events() {
            *counts.entry(event.name.clone()).or_default() += 1;
        }

        for contract in &mut self.contracts {
            let source = contract.name.clone();
            for event in &mut contract.events {
                if counts[&event.name] > 1 {
                    event.entity = format!("{}{}", source, event.name);
                }
            }
        }
        for template in &mut self.templates {
            let source = template.name.clone();
            for event in &mut template.events {
                if counts[&event.name] > 1 {
                    event.entity = format!("{}{}", source, event.name);
                }
            }
        }
    }

    fn all_events(&self) -> impl Iterator<Item = &PlannedEvent> {
        self.contracts
            .iter()
            .flat_map(|c| c.events.iter())
            .chain(self.templates.iter().flat_map(|t| t.events.iter()))
    }
}

/// Assign overload-unique local names within one source, in ABI order.
fn plan_events(events: Vec<&EventAbi>) -> Vec<PlannedEvent> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut planned = Vec::new();
    for event in events {
        let count = seen.entry(event.name.clone()).or_default();
        let name = if *count == 0 {
            event.name.clone()
        } else {
            format!("{}{}", event.name, count)
        };
        *count += 1;
        planned.push(PlannedEvent {
            abi: event.clone(),
            entity: name.clone(),
            name,
        });
    }
    planned
}

/// The `<Name>Event` stand-in for a contract with no resolvable ABI,
/// shaped so every renderer treats it like a real event.
fn placeholder_event(contract_name: &str) -> PlannedEvent {
    let name = format!("{}Event", contract_name);
    PlannedEvent {
        abi: EventAbi {
            name: name.clone(),
            params: vec![
                AbiParam {
                    name: "sender".to_string(),
                    sol_type: "address".to_string(),
                    graph_type: "Bytes".to_string(),
                    indexed: false,
                },
                AbiParam {
                    name: "value".to_string(),
                    sol_type: "uint256".to_string(),
                    graph_type: "BigInt".to_string(),
                    indexed: false,
                },
            ],
            signature: format!("{}(address,uint256)", name),
        },
        entity: name.clone(),
        name,
    }
}

/// Placeholder events for a template whose ABI is unavailable: one per
/// configured handler name, no parameters.
fn plan_named_placeholders(handler_names: &[String]) -> Vec<PlannedEvent> {
    handler_names
        .iter()
        .map(|name| PlannedEvent {
            abi: EventAbi {
                name: name.clone(),
                params: Vec::new(),
                signature: format!("{}()", name),
            },
            name: name.clone(),
            entity: name.clone(),
        })
        .collect()
}

fn plan_calls(signatures: &[String], abi: Option<&AbiModel>, source: &str) -> Vec<PlannedCall> {
    signatures
        .iter()
        .map(|configured| {
            let function_name = configured
                .split('(')
                .next()
                .unwrap_or(configured)
                .trim()
                .to_string();
            let inputs = match abi.and_then(|a| a.function_by_signature(configured)) {
                Some(function) => function.inputs.clone(),
                None => {
                    if abi.is_some() {
                        tracing::warn!(
                            source,
                            signature = configured.as_str(),
                            "call handler signature matches no ABI function; inputs unknown"
                        );
                    }
                    Vec::new()
                }
            };
            PlannedCall {
                configured: configured.clone(),
                handler: call_handler_name(&function_name),
                entity: call_entity_name(&function_name),
                function_name,
                inputs,
            }
        })
        .collect()
}

/// Every entity name the plan will declare, in schema order. Used by the
/// relationship pass to resolve endpoints.
pub fn entity_names(plan: &GenerationPlan) -> Vec<String> {
    let mut names = Vec::new();
    for contract in &plan.contracts {
        names.extend(contract.events.iter().map(|e| e.entity.clone()));
        names.extend(contract.calls.iter().map(|c| c.entity.clone()));
        if contract.block_handler {
            names.push(crate::generate::block_entity_name(&contract.name));
        }
    }
    for template in &plan.templates {
        names.extend(template.events.iter().map(|e| e.entity.clone()));
        names.extend(template.calls.iter().map(|c| c.entity.clone()));
        if template.block_handler {
            names.push(crate::generate::block_entity_name(&template.name));
        }
    }
    names
}
