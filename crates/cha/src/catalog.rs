//! The tea catalog and its lookups.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::types::{CatalogError, CatalogResult, Tea};

const BUILTIN_CATALOG: &str = include_str!("../data/teas.json");

/// An immutable, ordered collection of teas.
#[derive(Debug, Clone)]
pub struct TeaCatalog {
    teas: Vec<Tea>,
}

impl TeaCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog from a JSON array of teas.
    pub fn from_json(text: &str) -> CatalogResult<Self> {
        let teas: Vec<Tea> = serde_json::from_str(text)?;
        Self::new(teas)
    }

    /// Load a catalog from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        tracing::info!("Loading tea catalog: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build a catalog, rejecting empty input and colliding slugs.
    pub fn new(teas: Vec<Tea>) -> CatalogResult<Self> {
        if teas.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for tea in &teas {
            let s = slug(&tea.name);
            if !seen.insert(s.clone()) {
                return Err(CatalogError::DuplicateSlug(s));
            }
        }

        Ok(Self { teas })
    }

    pub fn teas(&self) -> &[Tea] {
        &self.teas
    }

    pub fn count(&self) -> usize {
        self.teas.len()
    }

    /// Teas whose type contains `query`, ignoring case and surrounding whitespace.
    pub fn by_type(&self, query: &str) -> Vec<&Tea> {
        let needle = query.trim().to_lowercase();
        self.teas
            .iter()
            .filter(|t| t.tea_type.to_lowercase().contains(&needle))
            .collect()
    }

    /// Teas whose origin contains `query`, ignoring case and surrounding whitespace.
    pub fn by_region(&self, query: &str) -> Vec<&Tea> {
        let needle = query.trim().to_lowercase();
        self.teas
            .iter()
            .filter(|t| t.origin.to_lowercase().contains(&needle))
            .collect()
    }

    /// Distinct tea types, sorted.
    pub fn types(&self) -> Vec<String> {
        distinct(self.teas.iter().map(|t| t.tea_type.as_str()))
    }

    /// Distinct origins, sorted.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.teas.iter().map(|t| t.origin.as_str()))
    }

    pub fn find_by_slug(&self, s: &str) -> Option<&Tea> {
        self.teas.iter().find(|t| slug(&t.name) == s)
    }
}

/// URL-friendly key for a tea name: lowercase, each whitespace run becomes
/// one `-`, leading and trailing runs included.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
