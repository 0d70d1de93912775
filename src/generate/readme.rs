//! README synthesis for the generated project.

use crate::config::model::ProjectConfig;
use crate::generate::plan::GenerationPlan;

pub fn render_readme(config: &ProjectConfig, plan: &GenerationPlan) -> String {
    let mut out = format!("# {}\n\n", config.name);
    out.push_str(&format!(
        "Subgraph indexing {} contract{} on **{}**. Generated by subgraph-forge \
         (complexity: {}, mappings: {}).\n\n",
        plan.contracts.len(),
        if plan.contracts.len() == 1 { "" } else { "s" },
        config.network,
        config.complexity,
        config.mappings_mode,
    ));

    out.push_str("## Contracts\n\n");
    for contract in &plan.contracts {
        out.push_str(&format!("### {}\n\n", contract.name));
        out.push_str(&format!("- Address: `{}`\n", contract.address));
        out.push_str(&format!("- Start block: {}\n", contract.start_block));
        out.push_str(&format!("- ABI: `abis/{}`\n", contract.abi_path));
        if contract.placeholder {
            out.push_str(
                "- Events: no ABI was available; a placeholder handler was generated. \
                 Drop the real ABI into `abis/` and regenerate.\n",
            );
        } else if !contract.events.is_empty() {
            let names: Vec<&str> = contract.events.iter().map(|e| e.name.as_str()).collect();
            out.push_str(&format!("- Events: {}\n", names.join(", ")));
        }
        if !contract.calls.is_empty() {
            let sigs: Vec<&str> = contract.calls.iter().map(|c| c.configured.as_str()).collect();
            out.push_str(&format!("- Call handlers: {}\n", sigs.join(", ")));
        }
        if contract.block_handler {
            out.push_str("- Block handler: enabled\n");
        }
        out.push('\n');
    }

    if !plan.templates.is_empty() {
        out.push_str("## Templates\n\n");
        out.push_str(
            "Dynamic data sources, instantiated at indexing time when their source event fires.\n\n",
        );
        for template in &plan.templates {
            let events: Vec<&str> = template.events.iter().map(|e| e.name.as_str()).collect();
            out.push_str(&format!(
                "- **{}** (`abis/{}`): {}\n",
                template.name,
                template.abi_path,
                events.join(", ")
            ));
        }
        out.push('\n');
    }

    out.push_str(
        "## Build and deploy\n\n\
         ```bash\n\
         npm install\n\
         npm run codegen\n\
         npm run build\n\
         npm run deploy\n\
         ```\n\n\
         ## Project layout\n\n\
         - `subgraph.yaml`: manifest wiring data sources to handlers\n\
         - `schema.graphql`: entity definitions\n\
         - `src/mappings/`: one handler file per contract or template\n\
         - `abis/`: contract ABI JSON files\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::model::AbiModel;
    use crate::config::model::ContractConfig;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_readme_lists_contract_and_events() {
        let config = ProjectConfig {
            config_version: 1,
            name: "dai-tracker".to_string(),
            network: "ethereum".to_string(),
            output_dir: "./out".to_string(),
            complexity: "basic".to_string(),
            mappings_mode: "auto".to_string(),
            contracts: vec![ContractConfig {
                name: "Dai".to_string(),
                address: "0x6B175474E89094C44Da98b954EedeAC495271d0F".to_string(),
                start_block: 8928158,
                abi_path: "Dai.json".to_string(),
                index_events: true,
                call_handlers: None,
                block_handler: false,
            }],
            templates: Vec::new(),
            entity_relationships: Vec::new(),
        };
        let mut abis = BTreeMap::new();
        abis.insert(
            "Dai".to_string(),
            AbiModel::normalize(&json!([
                {"type": "event", "name": "Transfer", "inputs": []}
            ]))
            .unwrap(),
        );
        let plan = GenerationPlan::build(&config, &abis);

        let readme = render_readme(&config, &plan);
        assert!(readme.starts_with("# dai-tracker\n"));
        assert!(readme.contains("### Dai"));
        assert!(readme.contains("`0x6B175474E89094C44Da98b954EedeAC495271d0F`"));
        assert!(readme.contains("Start block: 8928158"));
        assert!(readme.contains("Events: Transfer"));
        assert!(readme.contains("npm run codegen"));
    }

    #[test]
    fn test_readme_notes_placeholder() {
        let config = ProjectConfig {
            config_version: 1,
            name: "x".to_string(),
            network: "ethereum".to_string(),
            output_dir: "./out".to_string(),
            complexity: "basic".to_string(),
            mappings_mode: "auto".to_string(),
            contracts: vec![ContractConfig {
                name: "Mystery".to_string(),
                address: "0x1111111111111111111111111111111111111111".to_string(),
                start_block: 0,
                abi_path: "Mystery.json".to_string(),
                index_events: true,
                call_handlers: None,
                block_handler: false,
            }],
            templates: Vec::new(),
            entity_relationships: Vec::new(),
        };
        let plan = GenerationPlan::build(&config, &BTreeMap::new());
        let readme = render_readme(&config, &plan);
        assert!(readme.contains("placeholder handler"));
    }
}
