//! The seam to an external completion service (a hosted language model).
//!
//! The service is opaque: it takes a message list, the tool schemas, and an
//! optional system prompt, and returns content items. When the last item asks
//! for a tool, [`Assistant::ask`] runs it through `tools/call`, feeds the
//! result back, and asks once more.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{McpResult, ResourceDefinition, ToolCallResult, ToolDefinition};

use super::session::McpClient;

/// One conversation message. `content` is either a string or a list of
/// content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
}

impl ChatMessage {
    pub fn user(content: impl Into<Value>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<Value>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A content item produced by the completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// A tool as the completion service expects to see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

impl From<&ToolDefinition> for ToolSchema {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            input_schema: def.input_schema.clone(),
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
        system: Option<&str>,
    ) -> McpResult<Vec<CompletionContent>>;
}

/// A tool call requested by the model and run against the server.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub input: Value,
    pub result: ToolCallResult,
}

/// Everything that happened while answering one prompt.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub reply: Vec<CompletionContent>,
    pub tool_call: Option<ToolInvocation>,
    pub follow_up: Option<Vec<CompletionContent>>,
    pub messages: Vec<ChatMessage>,
}

/// Drives a completion service with the server's tools and resources.
pub struct Assistant<'a, S: ?Sized> {
    client: &'a McpClient,
    service: &'a S,
    tools: Vec<ToolSchema>,
    resources: Vec<ResourceDefinition>,
}

impl<'a, S: CompletionService + ?Sized> Assistant<'a, S> {
    /// Discover tools and resources from an initialized client.
    pub async fn new(client: &'a McpClient, service: &'a S) -> McpResult<Self> {
        let tools = client.list_tools().await?.iter().map(ToolSchema::from).collect();
        let resources = client.list_resources().await?;
        Ok(Self {
            client,
            service,
            tools,
            resources,
        })
    }

    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    /// Each resource's texts joined with newlines, resources concatenated
    /// back to back in listing order.
    pub async fn system_prompt(&self) -> McpResult<String> {
        let mut prompt = String::new();
        for resource in &self.resources {
            let result = self.client.read_resource(&resource.uri).await?;
            let texts: Vec<String> = result.contents.into_iter().filter_map(|c| c.text).collect();
            prompt.push_str(&texts.join("\n"));
        }
        Ok(prompt)
    }

    pub async fn ask(&self, prompt: &str) -> McpResult<Exchange> {
        let system = self.system_prompt().await?;
        let system = (!system.is_empty()).then_some(system.as_str());

        let mut messages = vec![ChatMessage::user(prompt)];
        let reply = self.service.complete(&messages, &self.tools, system).await?;
        messages.push(ChatMessage::assistant(serde_json::to_value(&reply)?));

        let Some(CompletionContent::ToolUse { id, name, input }) = reply.last().cloned() else {
            return Ok(Exchange {
                reply,
                tool_call: None,
                follow_up: None,
                messages,
            });
        };

        tracing::info!("Model requested tool {name}");
        let arguments = input.as_object().cloned().unwrap_or_default();
        let result = self.client.call_tool(&name, arguments).await?;
        let first_text = result
            .content
            .first()
            .map(|c| c.text().to_string())
            .unwrap_or_default();

        messages.push(ChatMessage::user(json!([{
            "type": "tool_result",
            "tool_use_id": id,
            "content": first_text,
        }])));

        let follow_up = self.service.complete(&messages, &self.tools, None).await?;
        messages.push(ChatMessage::assistant(serde_json::to_value(&follow_up)?));

        Ok(Exchange {
            reply,
            tool_call: Some(ToolInvocation {
                id,
                name,
                input,
                result,
            }),
            follow_up: Some(follow_up),
            messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_schema_renames_input_schema() {
        let def = crate::tools::teas_by_type::definition();
        let value = serde_json::to_value(ToolSchema::from(&def)).unwrap();
        assert!(value.get("input_schema").is_some());
        assert!(value.get("inputSchema").is_none());
    }

    #[test]
    fn test_completion_content_decoding() {
        let items: Vec<CompletionContent> = serde_json::from_value(json!([
            {"type": "text", "text": "Let me look."},
            {"type": "thinking", "thinking": "..."},
            {"type": "tool_use", "id": "tu_1", "name": "getTeasByType", "input": {"type": "Green"}}
        ]))
        .unwrap();
        assert_eq!(items[1], CompletionContent::Other);
        assert!(matches!(&items[2], CompletionContent::ToolUse { name, .. } if name == "getTeasByType"));
    }
}
