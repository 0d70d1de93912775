//! ABI normalization.
//!
//! Turns a raw ABI JSON array into typed event and function descriptors
//! with the Solidity-to-GraphQL type mapping applied up front. Entries
//! other than `event` and `function` (constructor, fallback, receive,
//! errors) are ignored rather than rejected; ABIs legitimately carry
//! entries the generator has no use for.

use alloy::dyn_abi::DynSolType;
use serde_json::Value;

use crate::errors::{ValidationCode, ValidationError};

/// One event or function parameter with its mapped schema type.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiParam {
    pub name: String,
    /// Solidity type as spelled in the ABI, e.g. `uint256`.
    pub sol_type: String,
    /// Mapped GraphQL scalar, e.g. `BigInt`.
    pub graph_type: String,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventAbi {
    pub name: String,
    pub params: Vec<AbiParam>,
    /// Manifest-form signature with indexed markers, e.g.
    /// `Transfer(indexed address,indexed address,uint256)`.
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAbi {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    /// Canonical call signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
}

/// Normalized view of one contract's ABI. Derived once per
/// contract/template per generation run and never persisted.
#[derive(Debug, Clone)]
pub struct AbiModel {
    pub events: Vec<EventAbi>,
    pub functions: Vec<FunctionAbi>,
    /// Raw ABI, re-emitted verbatim as the project's `abis/<file>.json`.
    pub raw: Value,
}

impl AbiModel {
    /// Normalize a raw ABI value. Shape failures (not a list of objects,
    /// retained entry without a name, parameter without a type) are
    /// `abi-shape` validation errors.
    pub fn normalize(raw: &Value) -> Result<Self, ValidationError> {
        let entries = raw.as_array().ok_or_else(|| {
            ValidationError::new(ValidationCode::AbiShape, "abi", "ABI must be a JSON array")
        })?;

        let mut events = Vec::new();
        let mut functions = Vec::new();

        for (idx, entry) in entries.iter().enumerate() {
            let obj = entry.as_object().ok_or_else(|| {
                ValidationError::new(
                    ValidationCode::AbiShape,
                    format!("abi[{}]", idx),
                    "ABI entry must be an object",
                )
            })?;
            let kind = obj.get("type").and_then(Value::as_str).ok_or_else(|| {
                ValidationError::new(
                    ValidationCode::AbiShape,
                    format!("abi[{}].type", idx),
                    "ABI entry missing 'type' field",
                )
            })?;

            match kind {
                "event" => {
                    let name = required_name(obj, idx)?;
                    let params = parse_params(obj.get("inputs"), idx)?;
                    let signature = event_signature(&name, &params);
                    events.push(EventAbi {
                        name,
                        params,
                        signature,
                    });
                }
                "function" => {
                    let name = required_name(obj, idx)?;
                    let inputs = parse_params(obj.get("inputs"), idx)?;
                    let signature = function_signature(&name, &inputs);
                    functions.push(FunctionAbi {
                        name,
                        inputs,
                        signature,
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            events,
            functions,
            raw: raw.clone(),
        })
    }

    pub fn event(&self, name: &str) -> Option<&EventAbi> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Look up a function by a configured call-handler signature.
    /// Matching is exact after canonicalization: whitespace stripped,
    /// types lowercased, function name case-sensitive.
    pub fn function_by_signature(&self, configured: &str) -> Option<&FunctionAbi> {
        let wanted = canonical_call_signature(configured)?;
        self.functions.iter().find(|f| f.signature == wanted)
    }
}

fn required_name(
    obj: &serde_json::Map<String, Value>,
    idx: usize,
) -> Result<String, ValidationError> {
    obj.get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ValidationError::new(
                ValidationCode::AbiShape,
                format!("abi[{}].name", idx),
                "ABI entry missing 'name' field",
            )
        })
}

fn parse_params(inputs: Option<&Value>, entry_idx: usize) -> Result<Vec<AbiParam>, ValidationError> {
    let Some(inputs) = inputs else {
        return Ok(Vec::new());
    };
    let list = inputs.as_array().ok_or_else(|| {
        ValidationError::new(
            ValidationCode::AbiShape,
            format!("abi[{}].inputs", entry_idx),
            "'inputs' must be a list",
        )
    })?;

    let mut params = Vec::new();
    for (i, input) in list.iter().enumerate() {
        let sol_type = input
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ValidationError::new(
                    ValidationCode::AbiShape,
                    format!("abi[{}].inputs[{}].type", entry_idx, i),
                    "parameter missing 'type' field",
                )
            })?
            .to_string();
        let name = input
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("param{}", i));
        let indexed = input
            .get("indexed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let graph_type = solidity_to_graph(&sol_type);
        params.push(AbiParam {
            name,
            sol_type,
            graph_type,
            indexed,
        });
    }
    Ok(params)
}

/// Map a Solidity type to its GraphQL scalar. Total: types that don't
/// parse, and shapes with no scalar counterpart (tuples), degrade to
/// `Bytes` with a warning instead of failing the whole ABI.
pub fn solidity_to_graph(sol_type: &str) -> String {
    match DynSolType::parse(sol_type) {
        Ok(ty) => dyn_type_to_graph(&ty),
        Err(_) => {
            tracing::warn!(sol_type = sol_type, "unknown Solidity type, defaulting to Bytes");
            "Bytes".to_string()
        }
    }
}

fn dyn_type_to_graph(ty: &DynSolType) -> String {
    match ty {
        DynSolType::Address => "Bytes".to_string(),
        DynSolType::Bool => "Boolean".to_string(),
        DynSolType::Uint(bits) | DynSolType::Int(bits) => {
            if *bits <= 32 {
                "Int".to_string()
            } else {
                "BigInt".to_string()
            }
        }
        DynSolType::FixedBytes(_) | DynSolType::Bytes => "Bytes".to_string(),
        DynSolType::String => "String".to_string(),
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => {
            format!("[{}!]", dyn_type_to_graph(inner))
        }
        other => {
            tracing::warn!(sol_type = %other, "no scalar mapping for Solidity type, defaulting to Bytes");
            "Bytes".to_string()
        }
    }
}

/// Manifest-form event signature: types in declaration order, indexed
/// parameters marked the way graph-cli expects them.
fn event_signature(name: &str, params: &[AbiParam]) -> String {
    let types: Vec<String> = params
        .iter()
        .map(|p| {
            if p.indexed {
                format!("indexed {}", p.sol_type)
            } else {
                p.sol_type.clone()
            }
        })
        .collect();
    format!("{}({})", name, types.join(","))
}

fn function_signature(name: &str, inputs: &[AbiParam]) -> String {
    let types: Vec<&str> = inputs.iter().map(|p| p.sol_type.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

/// Canonicalize a configured call-handler signature for matching:
/// whitespace stripped, types lowercased. Returns `None` when the string
/// isn't shaped like `name(type,...)` at all.
pub fn canonical_call_signature(sig: &str) -> Option<String> {
    let open = sig.find('(')?;
    let close = sig.rfind(')')?;
    if close < open {
        return None;
    }
    let name = sig[..open].trim();
    if name.is_empty() {
        return None;
    }
    let args = sig[open + 1..close].trim();
    let types: Vec<String> = if args.is_empty() {
        Vec::new()
    } else {
        args.split(',')
            .map(|t| t.trim().to_ascii_lowercase())
            .collect()
    };
    Some(format!("{}({})", name, types.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer_abi() -> Value {
        json!([
            {
                "type": "event",
                "name": "Transfer",
                "inputs": [
                    {"name": "from", "type": "address", "indexed": true},
                    {"name": "to", "type": "address", "indexed": true},
                    {"name": "value", "type": "uint256", "indexed": false}
                ]
            },
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    {"name": "to", "type": "address"},
                    {"name": "value", "type": "uint256"}
                ],
                "outputs": [{"name": "", "type": "bool"}],
                "stateMutability": "nonpayable"
            },
            {"type": "constructor", "inputs": []},
            {"type": "fallback"}
        ])
    }

    #[test]
    fn test_normalize_transfer_abi() {
        let abi = AbiModel::normalize(&transfer_abi()).unwrap();

        assert_eq!(abi.events.len(), 1);
        assert_eq!(abi.functions.len(), 1);

        let event = &abi.events[0];
        assert_eq!(event.name, "Transfer");
        assert_eq!(
            event.signature,
            "Transfer(indexed address,indexed address,uint256)"
        );
        assert_eq!(event.params.len(), 3);
        assert_eq!(event.params[0].name, "from");
        assert_eq!(event.params[0].graph_type, "Bytes");
        assert!(event.params[0].indexed);
        assert_eq!(event.params[2].name, "value");
        assert_eq!(event.params[2].graph_type, "BigInt");
        assert!(!event.params[2].indexed);

        let func = &abi.functions[0];
        assert_eq!(func.name, "transfer");
        assert_eq!(func.signature, "transfer(address,uint256)");
    }

    #[test]
    fn test_normalize_rejects_non_array() {
        let err = AbiModel::normalize(&json!({"type": "event"})).unwrap_err();
        assert_eq!(err.code, ValidationCode::AbiShape);
        assert_eq!(err.path, "abi");
    }

    #[test]
    fn test_normalize_rejects_non_object_entry() {
        let err = AbiModel::normalize(&json!(["event"])).unwrap_err();
        assert_eq!(err.code, ValidationCode::AbiShape);
        assert_eq!(err.path, "abi[0]");
    }

    #[test]
    fn test_normalize_rejects_unnamed_event() {
        let err = AbiModel::normalize(&json!([
            {"type": "event", "inputs": []}
        ]))
        .unwrap_err();
        assert_eq!(err.code, ValidationCode::AbiShape);
        assert_eq!(err.path, "abi[0].name");
    }

    #[test]
    fn test_normalize_rejects_missing_type() {
        let err = AbiModel::normalize(&json!([
            {"name": "Transfer", "inputs": []}
        ]))
        .unwrap_err();
        assert_eq!(err.path, "abi[0].type");
    }

    #[test]
    fn test_unnamed_params_get_positional_names() {
        let abi = AbiModel::normalize(&json!([
            {
                "type": "event",
                "name": "Ping",
                "inputs": [
                    {"name": "", "type": "address", "indexed": false},
                    {"type": "uint256", "indexed": false}
                ]
            }
        ]))
        .unwrap();
        let params = &abi.events[0].params;
        assert_eq!(params[0].name, "param0");
        assert_eq!(params[1].name, "param1");
    }

    #[test]
    fn test_unrecognized_entry_kinds_ignored() {
        let abi = AbiModel::normalize(&json!([
            {"type": "error", "name": "Unauthorized", "inputs": []},
            {"type": "receive", "stateMutability": "payable"},
            {"type": "mystery"}
        ]))
        .unwrap();
        assert!(abi.events.is_empty());
        assert!(abi.functions.is_empty());
    }

    #[test]
    fn test_type_mapping_table() {
        assert_eq!(solidity_to_graph("address"), "Bytes");
        assert_eq!(solidity_to_graph("bool"), "Boolean");
        assert_eq!(solidity_to_graph("string"), "String");
        assert_eq!(solidity_to_graph("bytes"), "Bytes");
        assert_eq!(solidity_to_graph("bytes32"), "Bytes");
        assert_eq!(solidity_to_graph("bytes4"), "Bytes");
        assert_eq!(solidity_to_graph("uint8"), "Int");
        assert_eq!(solidity_to_graph("uint24"), "Int");
        assert_eq!(solidity_to_graph("int32"), "Int");
        assert_eq!(solidity_to_graph("uint64"), "BigInt");
        assert_eq!(solidity_to_graph("int128"), "BigInt");
        assert_eq!(solidity_to_graph("uint256"), "BigInt");
        assert_eq!(solidity_to_graph("uint112"), "BigInt");
    }

    #[test]
    fn test_type_mapping_arrays() {
        assert_eq!(solidity_to_graph("uint256[]"), "[BigInt!]");
        assert_eq!(solidity_to_graph("address[4]"), "[Bytes!]");
        assert_eq!(solidity_to_graph("bool[][]"), "[[Boolean!]!]");
    }

    #[test]
    fn test_type_mapping_degrades_to_bytes() {
        assert_eq!(solidity_to_graph("structThing"), "Bytes");
        assert_eq!(solidity_to_graph(""), "Bytes");
        assert_eq!(solidity_to_graph("tuple"), "Bytes");
    }

    #[test]
    fn test_canonical_call_signature() {
        assert_eq!(
            canonical_call_signature("transfer(address,uint256)").unwrap(),
            "transfer(address,uint256)"
        );
        assert_eq!(
            canonical_call_signature("transfer( Address , UINT256 )").unwrap(),
            "transfer(address,uint256)"
        );
        assert_eq!(canonical_call_signature("pause()").unwrap(), "pause()");
        assert_eq!(canonical_call_signature("nope"), None);
        assert_eq!(canonical_call_signature("(address)"), None);
    }

    #[test]
    fn test_function_lookup_by_signature() {
        let abi = AbiModel::normalize(&transfer_abi()).unwrap();
        assert!(abi
            .function_by_signature("transfer( address, uint256 )")
            .is_some());
        assert!(abi.function_by_signature("transfer(address)").is_none());
        // name matching is case-sensitive
        assert!(abi.function_by_signature("Transfer(address,uint256)").is_none());
    }

    #[test]
    fn test_overloaded_events_both_retained() {
        let abi = AbiModel::normalize(&json!([
            {
                "type": "event",
                "name": "Deposit",
                "inputs": [{"name": "amount", "type": "uint256", "indexed": false}]
            },
            {
                "type": "event",
                "name": "Deposit",
                "inputs": [
                    {"name": "amount", "type": "uint256", "indexed": false},
                    {"name": "who", "type": "address", "indexed": true}
                ]
            }
        ]))
        .unwrap();
        assert_eq!(abi.events.len(), 2);
    }
}
