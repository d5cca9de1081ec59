//! Error types and JSON-RPC error codes for the MCP server and client.

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId};

/// Standard JSON-RPC 2.0 error codes.
///
/// Unknown resources and tools reuse `INVALID_REQUEST`; missing parameters use
/// `INVALID_PARAMS`.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// All errors that can occur in the MCP server or client.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Duplicate registry entry: {0}")]
    DuplicateEntry(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An error reply received from the peer.
    #[error("{message} (code {code})")]
    Rpc { code: i32, message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Session not initialized: call initialize first")]
    NotInitialized,

    #[error("Timed out waiting for reply to {0}")]
    Timeout(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] cha::CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MissingParameter(_) => INVALID_PARAMS,
            McpError::ResourceNotFound(_) | McpError::ToolNotFound(_) => INVALID_REQUEST,
            McpError::Rpc { code, .. } => *code,
            McpError::InternalError(_)
            | McpError::DuplicateEntry(_)
            | McpError::InvalidResponse(_)
            | McpError::ConnectionClosed
            | McpError::NotInitialized
            | McpError::Timeout(_)
            | McpError::Catalog(_)
            | McpError::Io(_) => INTERNAL_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.code(), self.to_string())
    }
}

impl From<JsonRpcErrorObject> for McpError {
    fn from(e: JsonRpcErrorObject) -> Self {
        McpError::Rpc {
            code: e.code,
            message: e.message,
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
