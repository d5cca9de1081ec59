//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit flag, then environment variable, then
//! built-in default.

use std::path::PathBuf;
use std::sync::Arc;

use cha::TeaCatalog;

use crate::types::McpResult;

/// Environment variable naming a catalog JSON file.
pub const CATALOG_ENV: &str = "CHA_CATALOG";
/// Environment variable holding the server command line for the client.
pub const SERVER_ENV: &str = "CHA_SERVER";

/// Resolve the catalog path, if any override is configured.
pub fn resolve_catalog_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    std::env::var(CATALOG_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Load the configured catalog, or the built-in one.
pub fn load_catalog(explicit: Option<&str>) -> McpResult<Arc<TeaCatalog>> {
    let catalog = match resolve_catalog_path(explicit) {
        Some(path) => TeaCatalog::from_file(path)?,
        None => TeaCatalog::builtin()?,
    };
    tracing::info!("Catalog ready: {} teas", catalog.count());
    Ok(Arc::new(catalog))
}

/// How the client launches its server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ServerCommand {
    /// Split a whitespace-separated command line. Returns `None` when blank.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = PathBuf::from(parts.next()?);
        Some(Self {
            program,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// This executable, in `serve` mode.
    pub fn current_exe() -> McpResult<Self> {
        Ok(Self {
            program: std::env::current_exe()?,
            args: vec!["serve".to_string()],
        })
    }
}

impl std::fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Resolve the server command line for client mode.
pub fn resolve_server_command(explicit: Option<&str>) -> McpResult<ServerCommand> {
    if let Some(cmd) = explicit.and_then(ServerCommand::parse) {
        return Ok(cmd);
    }

    if let Some(cmd) = std::env::var(SERVER_ENV)
        .ok()
        .as_deref()
        .and_then(ServerCommand::parse)
    {
        return Ok(cmd);
    }

    ServerCommand::current_exe()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let cmd = ServerCommand::parse("node ../server/dist/index.js").unwrap();
        assert_eq!(cmd.program, PathBuf::from("node"));
        assert_eq!(cmd.args, vec!["../server/dist/index.js"]);
        assert_eq!(cmd.to_string(), "node ../server/dist/index.js");
        assert!(ServerCommand::parse("   ").is_none());
    }

    #[test]
    fn test_explicit_wins() {
        let cmd = resolve_server_command(Some("cha-mcp serve --log-level debug")).unwrap();
        assert_eq!(cmd.args, vec!["serve", "--log-level", "debug"]);

        let path = resolve_catalog_path(Some("/tmp/teas.json")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/teas.json"));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teas.json");
        std::fs::write(
            &path,
            r#"[{"name":"Liu An Gua Pian","simplified":"六安瓜片","traditional":"六安瓜片",
                "description":"Melon-seed shaped green tea.","type":"Green","origin":"Anhui",
                "brewingTemp":"80°C","steepTime":"2 minutes"}]"#,
        )
        .unwrap();

        let catalog = load_catalog(path.to_str()).unwrap();
        assert_eq!(catalog.count(), 1);
        assert_eq!(catalog.teas()[0].name, "Liu An Gua Pian");
    }

    #[test]
    fn test_load_catalog_missing_file() {
        assert!(load_catalog(Some("/definitely/not/here/teas.json")).is_err());
    }
}
