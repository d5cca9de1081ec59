//! Cha MCP: a tea catalog served over the Model Context Protocol, plus the
//! client that drives it.

pub mod client;
pub mod config;
pub mod protocol;
pub mod repl;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use client::{McpClient, ServerProcess};
pub use config::{load_catalog, resolve_server_command};
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
