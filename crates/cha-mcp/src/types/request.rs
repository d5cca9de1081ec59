//! MCP request parameter types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{McpError, McpResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

impl ToolCallParams {
    /// Extract `name` and `arguments` from raw params; `arguments` defaults
    /// to `{}`.
    pub fn from_params(params: Option<&Value>) -> McpResult<Self> {
        let name = required_param(params, "name").ok_or(McpError::MissingParameter("name"))?;
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Self { name, arguments })
    }
}

impl ResourceReadParams {
    pub fn from_params(params: Option<&Value>) -> McpResult<Self> {
        let uri = required_param(params, "uri").ok_or(McpError::MissingParameter("uri"))?;
        Ok(Self { uri })
    }
}

/// Absent, `null`, `false`, `0` and `""` count as missing. Any other
/// non-string value is kept in its JSON rendering, so lookups fail with a
/// not-found error naming it.
fn required_param(params: Option<&Value>, key: &str) -> Option<String> {
    match params?.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_defaults_arguments() {
        let params = json!({"name": "getTeasByType"});
        let call = ToolCallParams::from_params(Some(&params)).unwrap();
        assert_eq!(call.name, "getTeasByType");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_tool_call_missing_name() {
        for params in [json!({}), json!({"name": ""}), json!({"name": null}), json!({"name": 0})] {
            let err = ToolCallParams::from_params(Some(&params)).unwrap_err();
            assert_eq!(err.to_string(), "Missing required parameter: name");
        }
        assert!(ToolCallParams::from_params(None).is_err());
    }

    #[test]
    fn test_non_string_values_are_rendered() {
        let call = ToolCallParams::from_params(Some(&json!({"name": 5}))).unwrap();
        assert_eq!(call.name, "5");

        let read = ResourceReadParams::from_params(Some(&json!({"uri": 12}))).unwrap();
        assert_eq!(read.uri, "12");

        let read = ResourceReadParams::from_params(Some(&json!({"uri": true}))).unwrap();
        assert_eq!(read.uri, "true");
    }

    #[test]
    fn test_resource_read_missing_uri() {
        let err = ResourceReadParams::from_params(Some(&json!({"url": "tea://teas"}))).unwrap_err();
        assert_eq!(err.code(), -32602);
        assert_eq!(err.to_string(), "Missing required parameter: uri");
    }
}
