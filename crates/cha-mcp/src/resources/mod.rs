//! MCP resource registry and the tea catalog resources.

pub mod registry;
pub mod teas;

pub use registry::{ResourceEntry, ResourceReader, ResourceRegistry};
