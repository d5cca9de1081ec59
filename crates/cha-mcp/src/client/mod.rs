//! Initiator side: request correlation, session handshake, child-process
//! wiring, and the completion-service seam.

pub mod completion;
pub mod correlator;
pub mod process;
pub mod session;

pub use completion::{Assistant, ChatMessage, CompletionContent, CompletionService, ToolSchema};
pub use correlator::JsonRpcClient;
pub use process::ServerProcess;
pub use session::{ClientSession, McpClient};
