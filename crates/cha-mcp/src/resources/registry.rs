//! Resource registration and dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use cha::TeaCatalog;

use crate::types::{McpError, McpResult, ReadResourceResult, ResourceDefinition};

use super::teas;

/// Produces the current contents of one resource.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn read(&self) -> McpResult<ReadResourceResult>;
}

/// An addressable read-only resource.
#[derive(Clone)]
pub struct ResourceEntry {
    definition: ResourceDefinition,
    reader: Arc<dyn ResourceReader>,
}

impl ResourceEntry {
    pub fn new(definition: ResourceDefinition, reader: impl ResourceReader + 'static) -> Self {
        Self {
            definition,
            reader: Arc::new(reader),
        }
    }

    pub fn uri(&self) -> &str {
        &self.definition.uri
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }
}

impl std::fmt::Debug for ResourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEntry")
            .field("uri", &self.definition.uri)
            .finish_non_exhaustive()
    }
}

/// Ordered set of resources, unique by URI.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: Vec<ResourceEntry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `tea://teas` followed by one `tea://teas/{slug}` per tea.
    pub fn for_catalog(catalog: Arc<TeaCatalog>) -> McpResult<Self> {
        let mut registry = Self::new();
        registry.register(teas::all_teas_entry(Arc::clone(&catalog)))?;
        for entry in teas::tea_entries(&catalog) {
            registry.register(entry)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, entry: ResourceEntry) -> McpResult<()> {
        if self.get(entry.uri()).is_some() {
            return Err(McpError::DuplicateEntry(entry.uri().to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, uri: &str) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| e.uri() == uri)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Public projection: uri, name, description, mime type.
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    pub async fn read(&self, uri: &str) -> McpResult<ReadResourceResult> {
        let entry = self
            .get(uri)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        tracing::debug!("Reading resource {uri}");
        entry.reader.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceContent;

    struct Greeting;

    #[async_trait]
    impl ResourceReader for Greeting {
        async fn read(&self) -> McpResult<ReadResourceResult> {
            Ok(ReadResourceResult {
                contents: vec![ResourceContent {
                    uri: "tea://greeting".to_string(),
                    mime_type: Some("text/plain".to_string()),
                    text: Some("请喝茶".to_string()),
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_read_custom_reader() {
        let definition = ResourceDefinition {
            uri: "tea://greeting".to_string(),
            name: "Greeting".to_string(),
            description: None,
            mime_type: Some("text/plain".to_string()),
        };
        let mut registry = ResourceRegistry::new();
        registry.register(ResourceEntry::new(definition, Greeting)).unwrap();

        let result = registry.read("tea://greeting").await.unwrap();
        assert_eq!(result.contents[0].text.as_deref(), Some("请喝茶"));
    }

    #[tokio::test]
    async fn test_unknown_uri() {
        let registry = ResourceRegistry::new();
        let err = registry.read("tea://teas/earl-grey").await.unwrap_err();
        assert_eq!(err.code(), -32600);
        assert_eq!(err.to_string(), "Resource not found: tea://teas/earl-grey");
    }

    #[test]
    fn test_catalog_registry_layout() {
        let catalog = Arc::new(TeaCatalog::builtin().unwrap());
        let registry = ResourceRegistry::for_catalog(Arc::clone(&catalog)).unwrap();
        assert_eq!(registry.len(), catalog.count() + 1);

        let listed = registry.list_resources();
        assert_eq!(listed[0].uri, "tea://teas");
        assert_eq!(listed[1].uri, "tea://teas/longjing");
        assert_eq!(listed[1].name, "Longjing (龍井)");
    }

    #[test]
    fn test_duplicate_uri_rejected() {
        let catalog = Arc::new(TeaCatalog::builtin().unwrap());
        let mut registry = ResourceRegistry::new();
        registry.register(teas::all_teas_entry(Arc::clone(&catalog))).unwrap();
        assert!(registry.register(teas::all_teas_entry(catalog)).is_err());
    }
}
