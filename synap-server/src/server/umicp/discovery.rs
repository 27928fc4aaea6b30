//! UMICP Tool Discovery for Synap
//!
//! Implements the DiscoverableService trait to expose all 8 MCP tools
//! via UMICP v0.2.3 tool discovery protocol

use serde_json::json;
use umicp_core::{DiscoverableService, OperationSchema, ServerInfo};

/// Synap Discovery Service
/// Exposes all MCP tools as UMICP-discoverable operations
pub struct SynapDiscoveryService;

impl DiscoverableService for SynapDiscoveryService {
    fn server_info(&self) -> ServerInfo {
        ServerInfo::new("synap-server", env!("CARGO_PKG_VERSION"), "UMICP/2.0")
            .features(vec![
                "key-value-store".to_string(),
                "message-queues".to_string(),
                "event-streams".to_string(),
                "pub-sub".to_string(),
                "kafka-partitioning".to_string(),
                "consumer-groups".to_string(),
                "persistence".to_string(),
                "replication".to_string(),
                "mcp-compatible".to_string(),
            ])
            .operations_count(13)
            .mcp_compatible(true)
            .metadata(json!({
                "description": "Synap - Unified messaging system (KV + Hash + List + Set + Queue + Stream + PubSub) with 13 core operations"
            }))
    }

    fn list_operations(&self) -> Vec<OperationSchema> {
        // Get all MCP tools
        let mcp_tools = crate::server::mcp_tools::get_mcp_tools();

        // Convert MCP Tools to UMICP OperationSchema
        mcp_tools
            .into_iter()
            .map(|tool| {
                let mut schema =
                    OperationSchema::new(tool.name.to_string(), json!(tool.input_schema));

                // Set title if available
                if let Some(title) = tool.title {
                    schema = schema.title(title);
                }

                // Set description if available
                if let Some(description) = tool.description {
                    schema = schema.description(description.to_string());
                }

                // Set output schema if available
                if let Some(output) = tool.output_schema {
                    schema = schema.output_schema(json!(output));
                }

                // Convert MCP annotations to UMICP annotations JSON
                if let Some(annotations) = tool.annotations {
                    let annotations_json = json!({
                        "read_only": annotations.read_only_hint,
                        "idempotent": annotations.idempotent_hint,
                        "destructive": annotations.destructive_hint,
                    });
                    schema = schema.annotations(annotations_json);
                }

                schema
            })
            .collect()
    }
}
