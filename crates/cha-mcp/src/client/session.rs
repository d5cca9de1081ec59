//! Client session: the initialize handshake and typed MCP calls.

use std::sync::OnceLock;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::protocol::methods;
use crate::types::{
    Implementation, InitializeParams, InitializeResult, McpError, McpResult, ReadResourceResult,
    ResourceDefinition, ResourceListResult, ResourceReadParams, ServerCapabilities,
    ToolCallParams, ToolCallResult, ToolDefinition, ToolListResult, MCP_VERSION,
};

use super::correlator::JsonRpcClient;

/// What the client learned from the server's `initialize` reply.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
}

impl ClientSession {
    pub fn supports_tools(&self) -> bool {
        self.capabilities.tools.is_some()
    }

    pub fn supports_resources(&self) -> bool {
        self.capabilities.resources.is_some()
    }

    pub fn version_matches(&self) -> bool {
        self.protocol_version == MCP_VERSION
    }
}

impl From<InitializeResult> for ClientSession {
    fn from(result: InitializeResult) -> Self {
        Self {
            protocol_version: result.protocol_version,
            capabilities: result.capabilities,
            server_info: result.server_info,
        }
    }
}

/// MCP client: sequences initialize, the initialized notification, then
/// discovery and invocation calls.
#[derive(Debug)]
pub struct McpClient {
    rpc: JsonRpcClient,
    session: OnceLock<ClientSession>,
}

impl McpClient {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self {
            rpc,
            session: OnceLock::new(),
        }
    }

    /// Build a client directly over a reader/writer pair.
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::new(JsonRpcClient::new(reader, writer))
    }

    pub fn rpc(&self) -> &JsonRpcClient {
        &self.rpc
    }

    pub fn session(&self) -> Option<&ClientSession> {
        self.session.get()
    }

    /// Perform the handshake once. Later calls return the stored session.
    pub async fn initialize(&self, client_info: Implementation) -> McpResult<&ClientSession> {
        if let Some(session) = self.session.get() {
            return Ok(session);
        }

        let result: InitializeResult = self
            .request(methods::INITIALIZE, InitializeParams::for_client(client_info))
            .await?;
        let session = ClientSession::from(result);

        if !session.version_matches() {
            tracing::warn!(
                "Server speaks protocol {}, client expects {}; continuing",
                session.protocol_version,
                MCP_VERSION
            );
        }
        tracing::info!(
            "Connected to {} v{}",
            session.server_info.name,
            session.server_info.version
        );

        self.rpc.notify(methods::INITIALIZED, json!({})).await?;

        Ok(self.session.get_or_init(|| session))
    }

    pub async fn ping(&self) -> McpResult<()> {
        self.ready()?;
        self.rpc.call(methods::PING, json!({})).await?;
        Ok(())
    }

    /// Ping with a bound on the wait, for liveness checks.
    pub async fn ping_timeout(&self, timeout: Duration) -> McpResult<()> {
        self.ready()?;
        self.rpc
            .call_with_timeout(methods::PING, json!({}), timeout)
            .await?;
        Ok(())
    }

    /// Tools the server exposes; empty without a round-trip when the server
    /// does not advertise the tools capability.
    pub async fn list_tools(&self) -> McpResult<Vec<ToolDefinition>> {
        if !self.ready()?.supports_tools() {
            return Ok(Vec::new());
        }
        let result: ToolListResult = self.request(methods::TOOLS_LIST, json!({})).await?;
        Ok(result.tools)
    }

    pub async fn list_resources(&self) -> McpResult<Vec<ResourceDefinition>> {
        if !self.ready()?.supports_resources() {
            return Ok(Vec::new());
        }
        let result: ResourceListResult = self.request(methods::RESOURCES_LIST, json!({})).await?;
        Ok(result.resources)
    }

    pub async fn read_resource(&self, uri: &str) -> McpResult<ReadResourceResult> {
        self.ready()?;
        let params = ResourceReadParams {
            uri: uri.to_string(),
        };
        self.request(methods::RESOURCES_READ, params).await
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> McpResult<ToolCallResult> {
        self.ready()?;
        let params = ToolCallParams {
            name: name.to_string(),
            arguments,
        };
        self.request(methods::TOOLS_CALL, params).await
    }

    fn ready(&self) -> McpResult<&ClientSession> {
        self.session.get().ok_or(McpError::NotInitialized)
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize,
    ) -> McpResult<R> {
        let value = self.rpc.call(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| McpError::InvalidResponse(format!("{method}: {e}")))
    }
}
