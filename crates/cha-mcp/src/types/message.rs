//! JSON-RPC 2.0 message types for the MCP protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Unique request identifier: a string, number, or null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(Number),
    Null,
}

impl RequestId {
    /// Numeric view of the id, accepting numeric strings from lax peers.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RequestId::Number(n) => n.as_u64(),
            RequestId::String(s) => s.parse().ok(),
            RequestId::Null => None,
        }
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        RequestId::Number(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

/// Error object within a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 notification (no id, no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Union type for any JSON-RPC message.
///
/// Variant order matters for untagged decoding. Prefer
/// [`JsonRpcMessage::from_value`], which classifies by key presence so a
/// document carrying an `id` is never read as a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Error(JsonRpcError),
    Notification(JsonRpcNotification),
}

impl JsonRpcMessage {
    /// Decode a document: `method` with `id` is a request, `method` alone a
    /// notification, `error` an error reply, anything else a success reply.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let has = |key: &str| value.get(key).is_some();
        if has("method") {
            if has("id") {
                serde_json::from_value(value).map(JsonRpcMessage::Request)
            } else {
                serde_json::from_value(value).map(JsonRpcMessage::Notification)
            }
        } else if has("error") {
            serde_json::from_value(value).map(JsonRpcMessage::Error)
        } else {
            serde_json::from_value(value).map(JsonRpcMessage::Response)
        }
    }
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: String, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method,
            params,
        }
    }
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcError {
    pub fn new(id: RequestId, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code,
                message,
                data: None,
            },
        }
    }
}

impl JsonRpcNotification {
    pub fn new(method: String, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_request() {
        let msg: JsonRpcMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 3, "method": "ping"})).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Request(r) if r.id == RequestId::from(3u64)));
    }

    #[test]
    fn test_any_numeric_id_is_a_request() {
        for id in [json!(9223372036854775808u64), json!(1.0), json!(-4)] {
            let doc = json!({"jsonrpc": "2.0", "id": id.clone(), "method": "ping"});
            let expected: RequestId = serde_json::from_value(id).unwrap();
            let msg = JsonRpcMessage::from_value(doc).unwrap();
            assert!(matches!(msg, JsonRpcMessage::Request(r) if r.id == expected));
        }
    }

    #[test]
    fn test_id_key_never_means_notification() {
        let msg = JsonRpcMessage::from_value(json!({"jsonrpc": "2.0", "id": null, "method": "ping"}))
            .unwrap();
        assert!(matches!(msg, JsonRpcMessage::Request(r) if r.id == RequestId::Null));

        let bad = JsonRpcMessage::from_value(json!({"jsonrpc": "2.0", "id": [1], "method": "ping"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_classify_notification() {
        let msg: JsonRpcMessage = serde_json::from_value(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized", "params": {}}),
        )
        .unwrap();
        assert!(matches!(msg, JsonRpcMessage::Notification(_)));
    }

    #[test]
    fn test_classify_replies() {
        let ok: JsonRpcMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": {}})).unwrap();
        assert!(matches!(ok, JsonRpcMessage::Response(_)));

        let err: JsonRpcMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32600, "message": "Tool not found: x"}
        }))
        .unwrap();
        assert!(matches!(err, JsonRpcMessage::Error(e) if e.error.code == -32600));
    }

    #[test]
    fn test_request_id_as_u64() {
        assert_eq!(RequestId::from(7u64).as_u64(), Some(7));
        assert_eq!(RequestId::String("8".into()).as_u64(), Some(8));
        assert_eq!(RequestId::Number((-1i64).into()).as_u64(), None);
        assert_eq!(RequestId::Null.as_u64(), None);
        assert_eq!(RequestId::from(u64::MAX).as_u64(), Some(u64::MAX));
    }
}
