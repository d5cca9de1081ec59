//! JSON-RPC envelope validation.

use serde_json::Value;

use crate::types::{McpError, McpResult, JSONRPC_VERSION};

/// Check that a raw document carries `"jsonrpc": "2.0"`.
pub fn validate_envelope(value: &Value) -> McpResult<()> {
    match value.get("jsonrpc").and_then(Value::as_str) {
        Some(JSONRPC_VERSION) => Ok(()),
        Some(other) => Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{other}\""
        ))),
        None => Err(McpError::InvalidRequest(
            "Missing jsonrpc version tag".to_string(),
        )),
    }
}
