//! MCP tool registry and the tea lookup tools.

pub mod registry;
pub mod teas_by_region;
pub mod teas_by_type;

pub use registry::{ToolEntry, ToolHandler, ToolRegistry};
