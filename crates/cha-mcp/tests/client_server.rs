//! Initiator against a real responder wired in-process over `tokio::io::duplex`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

use cha::TeaCatalog;
use cha_mcp::client::{
    Assistant, ChatMessage, CompletionContent, CompletionService, McpClient, ToolSchema,
};
use cha_mcp::protocol::ProtocolHandler;
use cha_mcp::transport::StdioTransport;
use cha_mcp::types::{Implementation, McpError, McpResult};

// ─────────────────────── helpers ───────────────────────

/// Start a responder task and return a client connected to it.
fn connected_pair() -> (McpClient, JoinHandle<McpResult<()>>) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);

    let catalog = Arc::new(TeaCatalog::builtin().unwrap());
    let handler = ProtocolHandler::for_catalog(catalog).unwrap();
    let (server_read, server_write) = tokio::io::split(server_io);
    let server = tokio::spawn(async move {
        StdioTransport::new(handler)
            .serve(server_read, server_write)
            .await
    });

    let (client_read, client_write) = tokio::io::split(client_io);
    (McpClient::connect(client_read, client_write), server)
}

async fn initialized_client() -> (McpClient, JoinHandle<McpResult<()>>) {
    let (client, server) = connected_pair();
    client.initialize(Implementation::client()).await.unwrap();
    (client, server)
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// ─────────────────────── session ───────────────────────

#[tokio::test]
async fn test_handshake_records_session() {
    let (client, _server) = connected_pair();
    assert!(client.session().is_none());

    let session = client.initialize(Implementation::client()).await.unwrap();
    assert_eq!(session.server_info.name, "茶");
    assert_eq!(session.protocol_version, "2024-11-05");
    assert!(session.supports_tools());
    assert!(session.supports_resources());
    assert!(session.version_matches());

    // initialize took id 0; the notification consumes none.
    assert_eq!(client.rpc().peek_next_id(), 1);
}

#[tokio::test]
async fn test_initialize_twice_reuses_session() {
    let (client, _server) = initialized_client().await;
    client.initialize(Implementation::client()).await.unwrap();
    assert_eq!(client.rpc().peek_next_id(), 1);
}

#[tokio::test]
async fn test_calls_before_initialize_rejected() {
    let (client, _server) = connected_pair();
    assert!(matches!(client.ping().await, Err(McpError::NotInitialized)));
    assert!(matches!(client.list_tools().await, Err(McpError::NotInitialized)));
    assert!(matches!(
        client.read_resource("tea://teas").await,
        Err(McpError::NotInitialized)
    ));
    assert!(matches!(
        client.call_tool("getTeasByType", Map::new()).await,
        Err(McpError::NotInitialized)
    ));
    assert_eq!(client.rpc().peek_next_id(), 0);
}

#[tokio::test]
async fn test_ping() {
    let (client, _server) = initialized_client().await;
    client.ping().await.unwrap();
    client.ping_timeout(Duration::from_secs(5)).await.unwrap();
    assert_eq!(client.rpc().peek_next_id(), 3);
}

// ─────────────────────── discovery & calls ───────────────────────

#[tokio::test]
async fn test_discovery() {
    let (client, _server) = initialized_client().await;

    let tools = client.list_tools().await.unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["getTeasByType", "getTeasByRegion"]);

    let resources = client.list_resources().await.unwrap();
    assert_eq!(resources.len(), 13);
    assert_eq!(resources[0].uri, "tea://teas");
}

#[tokio::test]
async fn test_call_tool_by_region() {
    let (client, _server) = initialized_client().await;
    let result = client
        .call_tool("getTeasByRegion", args(json!({"region": "Yunnan"})))
        .await
        .unwrap();

    let payload: Value = serde_json::from_str(result.content[0].text()).unwrap();
    assert_eq!(payload["matches"], 2);
    assert_eq!(payload["region"], "Yunnan");
}

#[tokio::test]
async fn test_call_unknown_tool_surfaces_rpc_error() {
    let (client, _server) = initialized_client().await;
    let err = client.call_tool("brewTea", Map::new()).await.unwrap_err();
    match err {
        McpError::Rpc { code, message } => {
            assert_eq!(code, -32600);
            assert_eq!(message, "Tool not found: brewTea");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The session survives an error reply.
    client.ping().await.unwrap();
}

#[tokio::test]
async fn test_read_resource() {
    let (client, _server) = initialized_client().await;
    let result = client.read_resource("tea://teas/keemun").await.unwrap();
    let tea: Value = serde_json::from_str(result.contents[0].text.as_deref().unwrap()).unwrap();
    assert_eq!(tea["type"], "Black");

    let err = client.read_resource("tea://teas/nope").await.unwrap_err();
    assert_eq!(err.code(), -32600);
    assert_eq!(err.to_string(), "Resource not found: tea://teas/nope (code -32600)");
}

#[tokio::test]
async fn test_unknown_method_times_out_without_reply() {
    let (client, _server) = initialized_client().await;
    let err = client
        .rpc()
        .call_with_timeout("prompts/list", json!({}), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::Timeout(_)));

    // The dropped request leaves the stream usable.
    client.ping().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_calls_matched_by_id() {
    let (client, _server) = initialized_client().await;
    let (green, oolong, pong) = tokio::join!(
        client.call_tool("getTeasByType", args(json!({"type": "Green"}))),
        client.call_tool("getTeasByType", args(json!({"type": "Oolong"}))),
        client.ping(),
    );

    let green: Value = serde_json::from_str(green.unwrap().content[0].text()).unwrap();
    let oolong: Value = serde_json::from_str(oolong.unwrap().content[0].text()).unwrap();
    assert_eq!(green["type"], "Green");
    assert_eq!(oolong["type"], "Oolong");
    pong.unwrap();
}

#[tokio::test]
async fn test_server_exit_fails_pending_calls() {
    let (client_io, server_io) = tokio::io::duplex(1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let client = McpClient::connect(client_read, client_write);
    drop(server_io);

    let err = client.initialize(Implementation::client()).await.unwrap_err();
    assert!(matches!(err, McpError::ConnectionClosed | McpError::Io(_)));
}

// ─────────────────────── completion seam ───────────────────────

/// A completion service that replays scripted replies and records requests.
#[derive(Default)]
struct ScriptedService {
    replies: Mutex<VecDeque<Vec<CompletionContent>>>,
    seen: Mutex<Vec<(Vec<ChatMessage>, Option<String>)>>,
}

impl ScriptedService {
    fn new(replies: Vec<Vec<CompletionContent>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::default(),
        }
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
        system: Option<&str>,
    ) -> McpResult<Vec<CompletionContent>> {
        assert_eq!(tools.len(), 2);
        self.seen
            .lock()
            .unwrap()
            .push((messages.to_vec(), system.map(str::to_string)));
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

fn text(s: &str) -> CompletionContent {
    CompletionContent::Text {
        text: s.to_string(),
    }
}

#[tokio::test]
async fn test_assistant_plain_answer() {
    let (client, _server) = initialized_client().await;
    let service = ScriptedService::new(vec![vec![text("Longjing is a green tea.")]]);
    let assistant = Assistant::new(&client, &service).await.unwrap();

    let exchange = assistant.ask("What is Longjing?").await.unwrap();
    assert_eq!(exchange.reply, vec![text("Longjing is a green tea.")]);
    assert!(exchange.tool_call.is_none());
    assert!(exchange.follow_up.is_none());
    assert_eq!(exchange.messages.len(), 2);

    let seen = service.seen.lock().unwrap();
    let system = seen[0].1.as_deref().unwrap();
    assert!(system.contains("\"totalTeas\":12"));
    assert!(system.contains("Da Hong Pao"));
}

#[tokio::test]
async fn test_assistant_runs_requested_tool() {
    let (client, _server) = initialized_client().await;
    let service = ScriptedService::new(vec![
        vec![
            text("Let me check."),
            CompletionContent::ToolUse {
                id: "tu_1".to_string(),
                name: "getTeasByRegion".to_string(),
                input: json!({"region": "Fujian"}),
            },
        ],
        vec![text("Fujian grows three teas in this catalog.")],
    ]);
    let assistant = Assistant::new(&client, &service).await.unwrap();

    let exchange = assistant.ask("Which teas come from Fujian?").await.unwrap();

    let call = exchange.tool_call.unwrap();
    assert_eq!(call.name, "getTeasByRegion");
    let payload: Value = serde_json::from_str(call.result.content[0].text()).unwrap();
    assert_eq!(payload["matches"], 3);

    assert_eq!(
        exchange.follow_up.unwrap(),
        vec![text("Fujian grows three teas in this catalog.")]
    );
    assert_eq!(exchange.messages.len(), 4);

    let seen = service.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[1].1.is_none());
    let tool_result = &seen[1].0[2];
    assert_eq!(tool_result.role, "user");
    assert_eq!(tool_result.content[0]["type"], "tool_result");
    assert_eq!(tool_result.content[0]["tool_use_id"], "tu_1");
    assert!(tool_result.content[0]["content"]
        .as_str()
        .unwrap()
        .contains("\"region\":\"Fujian\""));
}

#[tokio::test]
async fn test_system_prompt_concatenates_resources() {
    let (client, _server) = initialized_client().await;
    let service = ScriptedService::default();
    let assistant = Assistant::new(&client, &service).await.unwrap();

    let mut expected = String::new();
    for resource in client.list_resources().await.unwrap() {
        let result = client.read_resource(&resource.uri).await.unwrap();
        expected.push_str(result.contents[0].text.as_deref().unwrap());
    }

    let prompt = assistant.system_prompt().await.unwrap();
    assert_eq!(prompt, expected);
    assert!(!prompt.contains('\n'));
    assert!(prompt.contains("\"totalTeas\":12"));
}
