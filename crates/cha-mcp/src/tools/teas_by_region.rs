//! The `getTeasByRegion` tool: teas whose origin contains the query.

use std::sync::Arc;

use async_trait::async_trait;
use cha::TeaCatalog;
use serde_json::{json, Map, Value};

use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::registry::ToolHandler;

pub const NAME: &str = "getTeasByRegion";

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some("Get all teas from a specific province or region".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "region": {
                    "type": "string",
                    "description": "Province or region name to search for"
                }
            },
            "required": ["region"]
        }),
    }
}

pub fn execute(args: &Map<String, Value>, catalog: &TeaCatalog) -> ToolCallResult {
    let query = args.get("region").and_then(Value::as_str).unwrap_or("").trim();
    if query.is_empty() {
        return ToolCallResult::json(&json!({ "error": "Region parameter cannot be empty" }));
    }

    let matches = catalog.by_region(query);
    let Some(first) = matches.first() else {
        return ToolCallResult::json(&json!({
            "matches": 0,
            "message": format!("Teas from {query} not found"),
            "availableRegions": catalog.regions(),
        }));
    };

    let teas: Vec<_> = matches
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "simplified": t.simplified,
                "traditional": t.traditional,
                "type": t.tea_type,
            })
        })
        .collect();

    ToolCallResult::json(&json!({
        "matches": matches.len(),
        "region": first.origin,
        "teas": teas,
    }))
}

pub struct TeasByRegion {
    catalog: Arc<TeaCatalog>,
}

impl TeasByRegion {
    pub fn new(catalog: Arc<TeaCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ToolHandler for TeasByRegion {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn execute(&self, arguments: Map<String, Value>) -> McpResult<ToolCallResult> {
        Ok(execute(&arguments, &self.catalog))
    }
}
