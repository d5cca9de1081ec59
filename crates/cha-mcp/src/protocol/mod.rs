//! MCP protocol handling: JSON-RPC dispatch.

pub mod handler;
pub mod negotiation;
pub mod route;
pub mod validator;

pub use handler::{Dispatch, ProtocolHandler, Silence};
pub use route::{methods, Route};
