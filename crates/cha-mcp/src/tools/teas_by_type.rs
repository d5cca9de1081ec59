//! The `getTeasByType` tool: teas whose type contains the query.

use std::sync::Arc;

use async_trait::async_trait;
use cha::TeaCatalog;
use serde_json::{json, Map, Value};

use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::registry::ToolHandler;

pub const NAME: &str = "getTeasByType";

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some("Get all teas of a specific type".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "Tea type to search for"
                }
            },
            "required": ["type"]
        }),
    }
}

pub fn execute(args: &Map<String, Value>, catalog: &TeaCatalog) -> ToolCallResult {
    let query = args.get("type").and_then(Value::as_str).unwrap_or("").trim();
    if query.is_empty() {
        return ToolCallResult::json(&json!({ "error": "Type parameter cannot be empty" }));
    }

    let matches = catalog.by_type(query);
    let Some(first) = matches.first() else {
        return ToolCallResult::json(&json!({
            "matches": 0,
            "message": format!("Teas of type {query} not found"),
            "availableTypes": catalog.types(),
        }));
    };

    let teas: Vec<_> = matches
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "simplified": t.simplified,
                "traditional": t.traditional,
                "origin": t.origin,
            })
        })
        .collect();

    ToolCallResult::json(&json!({
        "matches": matches.len(),
        "type": first.tea_type,
        "teas": teas,
    }))
}

pub struct TeasByType {
    catalog: Arc<TeaCatalog>,
}

impl TeasByType {
    pub fn new(catalog: Arc<TeaCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ToolHandler for TeasByType {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn execute(&self, arguments: Map<String, Value>) -> McpResult<ToolCallResult> {
        Ok(execute(&arguments, &self.catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: Value) -> Value {
        let catalog = TeaCatalog::builtin().unwrap();
        let args = args.as_object().cloned().unwrap_or_default();
        serde_json::from_str(execute(&args, &catalog).content[0].text()).unwrap()
    }

    #[test]
    fn test_empty_type_is_content_error() {
        assert_eq!(run(json!({"type": ""})), json!({"error": "Type parameter cannot be empty"}));
        assert_eq!(run(json!({"type": "   "}))["error"], "Type parameter cannot be empty");
        assert_eq!(run(json!({}))["error"], "Type parameter cannot be empty");
        assert_eq!(run(json!({"type": 3}))["error"], "Type parameter cannot be empty");
    }

    #[test]
    fn test_matches_case_insensitive() {
        let payload = run(json!({"type": " gREEN "}));
        assert!(payload["matches"].as_u64().unwrap() >= 1);
        assert_eq!(payload["type"], "Green");
        for tea in payload["teas"].as_array().unwrap() {
            assert!(tea.get("origin").is_some());
            assert!(tea.get("type").is_none());
        }
    }

    #[test]
    fn test_no_match_lists_alternatives() {
        let payload = run(json!({"type": "Herbal"}));
        assert_eq!(payload["matches"], 0);
        assert_eq!(payload["message"], "Teas of type Herbal not found");
        let types: Vec<_> = payload["availableTypes"].as_array().unwrap().clone();
        let mut sorted = types.clone();
        sorted.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        assert_eq!(types, sorted);
        assert!(types.contains(&json!("Oolong")));
    }
}
