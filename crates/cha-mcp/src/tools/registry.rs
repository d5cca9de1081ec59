//! Tool registration and dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use cha::TeaCatalog;
use serde_json::{Map, Value};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::teas_by_region::TeasByRegion;
use super::teas_by_type::TeasByType;

/// Something a client can invoke through `tools/call`.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, arguments: Map<String, Value>) -> McpResult<ToolCallResult>;
}

/// A named tool: its public definition plus the handler that runs it.
#[derive(Clone)]
pub struct ToolEntry {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

impl ToolEntry {
    /// The definition is captured once, at registration.
    pub fn new(handler: impl ToolHandler + 'static) -> Self {
        Self {
            definition: handler.definition(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

/// Ordered set of tools, unique by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tea lookup tools backed by `catalog`.
    pub fn for_catalog(catalog: Arc<TeaCatalog>) -> McpResult<Self> {
        let mut registry = Self::new();
        registry.register(ToolEntry::new(TeasByType::new(Arc::clone(&catalog))))?;
        registry.register(ToolEntry::new(TeasByRegion::new(catalog)))?;
        Ok(registry)
    }

    pub fn register(&mut self, entry: ToolEntry) -> McpResult<()> {
        if self.get(entry.name()).is_some() {
            return Err(McpError::DuplicateEntry(entry.name().to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Public projection: name, description, schema. Handlers stay private.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    pub async fn call(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> McpResult<ToolCallResult> {
        let entry = self
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        tracing::debug!("Calling tool {name}");
        entry.handler.execute(arguments).await
    }
}
