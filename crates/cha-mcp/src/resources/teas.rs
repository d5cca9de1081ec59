//! Resources: tea://teas and tea://teas/{slug}

use std::sync::Arc;

use async_trait::async_trait;
use cha::{slug, Tea, TeaCatalog};
use serde_json::json;

use crate::types::{McpResult, ReadResourceResult, ResourceContent, ResourceDefinition};

use super::registry::{ResourceEntry, ResourceReader};

pub const ALL_TEAS_URI: &str = "tea://teas";
const MIME_JSON: &str = "application/json";

pub fn tea_uri(tea: &Tea) -> String {
    format!("{ALL_TEAS_URI}/{}", slug(&tea.name))
}

pub fn all_teas_entry(catalog: Arc<TeaCatalog>) -> ResourceEntry {
    let definition = ResourceDefinition {
        uri: ALL_TEAS_URI.to_string(),
        name: "All Teas".to_string(),
        description: Some("List of all available teas".to_string()),
        mime_type: Some(MIME_JSON.to_string()),
    };

    ResourceEntry::new(definition, AllTeas { catalog })
}

pub fn tea_entries(catalog: &TeaCatalog) -> Vec<ResourceEntry> {
    catalog
        .teas()
        .iter()
        .map(|tea| {
            let definition = ResourceDefinition {
                uri: tea_uri(tea),
                name: format!("{} ({})", tea.name, tea.traditional),
                description: Some(format!("Details of {}", tea.name)),
                mime_type: Some(MIME_JSON.to_string()),
            };
            ResourceEntry::new(definition, TeaRecord { tea: tea.clone() })
        })
        .collect()
}

pub fn read_all(catalog: &TeaCatalog) -> McpResult<ReadResourceResult> {
    let teas: Vec<_> = catalog
        .teas()
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "simplified": t.simplified,
                "traditional": t.traditional,
                "type": t.tea_type,
                "origin": t.origin,
            })
        })
        .collect();

    let content = json!({
        "totalTeas": catalog.count(),
        "teas": teas,
    });

    Ok(ReadResourceResult {
        contents: vec![ResourceContent {
            uri: ALL_TEAS_URI.to_string(),
            mime_type: Some(MIME_JSON.to_string()),
            text: Some(serde_json::to_string(&content)?),
        }],
    })
}

pub fn read_tea(tea: &Tea) -> McpResult<ReadResourceResult> {
    Ok(ReadResourceResult {
        contents: vec![ResourceContent {
            uri: tea_uri(tea),
            mime_type: Some(MIME_JSON.to_string()),
            text: Some(serde_json::to_string(tea)?),
        }],
    })
}

struct AllTeas {
    catalog: Arc<TeaCatalog>,
}

#[async_trait]
impl ResourceReader for AllTeas {
    async fn read(&self) -> McpResult<ReadResourceResult> {
        read_all(&self.catalog)
    }
}

struct TeaRecord {
    tea: Tea,
}

#[async_trait]
impl ResourceReader for TeaRecord {
    async fn read(&self) -> McpResult<ReadResourceResult> {
        read_tea(&self.tea)
    }
}
