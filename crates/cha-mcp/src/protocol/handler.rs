//! Main request dispatcher: receives JSON-RPC documents, routes to handlers.

use std::sync::Arc;

use cha::TeaCatalog;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::route::Route;
use super::validator::validate_envelope;

/// Outcome of processing one inbound document.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Write this document back to the peer.
    Reply(Value),
    /// Nothing is written.
    NoReply(Silence),
}

/// Why a document produced no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Silence {
    /// Missing or wrong `jsonrpc` tag.
    NotJsonRpc,
    /// Tagged as JSON-RPC but not a recognizable message shape.
    Malformed,
    Notification,
    /// A response or error arrived; the server never issues requests.
    UnexpectedReply,
    /// Method not in the routing table, or a notification-only method sent
    /// as a request.
    Unhandled(String),
}

impl Dispatch {
    pub fn into_reply(self) -> Option<Value> {
        match self {
            Dispatch::Reply(value) => Some(value),
            Dispatch::NoReply(_) => None,
        }
    }
}

/// The main protocol handler that dispatches incoming JSON-RPC messages.
///
/// Registries are fixed at construction; the only mutable state is the
/// handshake record.
pub struct ProtocolHandler {
    resources: ResourceRegistry,
    tools: ToolRegistry,
    capabilities: Mutex<NegotiatedCapabilities>,
}

impl ProtocolHandler {
    pub fn new(resources: ResourceRegistry, tools: ToolRegistry) -> Self {
        Self {
            resources,
            tools,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
        }
    }

    /// A handler serving the tea tools and resources for `catalog`.
    pub fn for_catalog(catalog: Arc<TeaCatalog>) -> McpResult<Self> {
        let resources = ResourceRegistry::for_catalog(Arc::clone(&catalog))?;
        let tools = ToolRegistry::for_catalog(catalog)?;
        Ok(Self::new(resources, tools))
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Snapshot of the handshake state.
    pub async fn negotiated(&self) -> NegotiatedCapabilities {
        self.capabilities.lock().await.clone()
    }

    /// Process a raw document and return the reply, if any.
    pub async fn handle_message(&self, value: Value) -> Option<Value> {
        self.dispatch(value).await.into_reply()
    }

    /// Process a raw document to completion.
    pub async fn dispatch(&self, value: Value) -> Dispatch {
        if let Err(e) = validate_envelope(&value) {
            tracing::debug!("Ignoring document: {e}");
            return Dispatch::NoReply(Silence::NotJsonRpc);
        }

        let msg = match JsonRpcMessage::from_value(value) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("Ignoring malformed JSON-RPC document: {e}");
                return Dispatch::NoReply(Silence::Malformed);
            }
        };

        match msg {
            JsonRpcMessage::Request(req) => self.handle_request(req).await,
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                Dispatch::NoReply(Silence::Notification)
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) => {
                tracing::warn!("Received unexpected reply from client");
                Dispatch::NoReply(Silence::UnexpectedReply)
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Dispatch {
        let route = Route::from_method(&request.method);
        if !route.expects_reply() {
            tracing::debug!("Unhandled method {:?} (id {})", request.method, request.id);
            return Dispatch::NoReply(Silence::Unhandled(request.method));
        }

        let id = request.id;
        let reply = match self.dispatch_request(&route, request.params).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)),
            Err(e) => {
                tracing::debug!("Request {id} failed: {e}");
                serde_json::to_value(e.to_json_rpc_error(id))
            }
        };

        match reply {
            Ok(value) => Dispatch::Reply(value),
            Err(e) => {
                tracing::error!("Failed to encode reply: {e}");
                Dispatch::NoReply(Silence::Malformed)
            }
        }
    }

    async fn dispatch_request(&self, route: &Route, params: Option<Value>) -> McpResult<Value> {
        match route {
            Route::Initialize => self.handle_initialize(params).await,
            Route::Ping => Ok(Value::Object(serde_json::Map::new())),

            Route::ResourcesList => self.handle_resources_list(),
            Route::ResourcesRead => self.handle_resources_read(params.as_ref()).await,

            Route::ToolsList => self.handle_tools_list(),
            Route::ToolsCall => self.handle_tools_call(params.as_ref()).await,

            Route::Initialized | Route::Unhandled(_) => Err(McpError::InternalError(format!(
                "route {route:?} has no request handler"
            ))),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match Route::from_method(&notification.method) {
            Route::Initialized => {
                self.capabilities.lock().await.mark_initialized();
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = match params {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Unreadable initialize params ({e}); using defaults");
                InitializeParams::default()
            }),
            None => InitializeParams::default(),
        };

        let result = self.capabilities.lock().await.negotiate(init_params);

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.tools.list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<&Value>) -> McpResult<Value> {
        let call_params = ToolCallParams::from_params(params)?;

        let result = self
            .tools
            .call(&call_params.name, call_params.arguments)
            .await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_resources_list(&self) -> McpResult<Value> {
        let result = ResourceListResult {
            resources: self.resources.list_resources(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_resources_read(&self, params: Option<&Value>) -> McpResult<Value> {
        let read_params = ResourceReadParams::from_params(params)?;

        let result = self.resources.read(&read_params.uri).await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}
