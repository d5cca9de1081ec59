//! MCP capability negotiation during initialization.

use crate::types::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, MCP_VERSION,
};

/// What the server remembers about the client after the handshake.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client: ClientCapabilities,
    pub client_info: Option<Implementation>,
    pub negotiated: bool,
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Record the client's declaration and answer with the server's fixed
    /// version. Mismatched versions are logged, never rejected.
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if self.negotiated {
            tracing::warn!("Repeated initialize; answering again");
        }

        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {:?}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        match &params.client_info {
            Some(info) => tracing::info!("Initialized with client: {} v{}", info.name, info.version),
            None => tracing::info!("Initialized with anonymous client"),
        }

        self.client = params.capabilities;
        self.client_info = params.client_info;
        self.negotiated = true;

        InitializeResult::default_result()
    }

    pub fn mark_initialized(&mut self) {
        if !self.negotiated {
            tracing::warn!("initialized notification arrived before initialize");
        }
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_version_answers_with_server_version() {
        let mut caps = NegotiatedCapabilities::default();
        let result = caps.negotiate(InitializeParams {
            protocol_version: "2025-06-18".to_string(),
            ..Default::default()
        });
        assert_eq!(result.protocol_version, MCP_VERSION);
        assert!(caps.negotiated);
        assert!(!caps.initialized);

        caps.mark_initialized();
        assert!(caps.initialized);
    }
}
