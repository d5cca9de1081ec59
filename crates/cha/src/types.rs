//! Core data types for the tea catalog.

use serde::{Deserialize, Serialize};

/// A single tea in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tea {
    pub name: String,
    pub simplified: String,
    pub traditional: String,
    pub description: String,
    #[serde(rename = "type")]
    pub tea_type: String,
    pub origin: String,
    pub brewing_temp: String,
    pub steep_time: String,
}

/// Errors that can occur while loading a catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog contains no teas")]
    Empty,

    #[error("Duplicate tea slug: {0}")]
    DuplicateSlug(String),
}

/// Convenience result type.
pub type CatalogResult<T> = Result<T, CatalogError>;
