//! The fixed method routing table.

/// Method names understood by the server.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const INITIALIZED_LEGACY: &str = "initialized";
    pub const PING: &str = "ping";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Where an inbound method goes. Anything not in the table is `Unhandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Initialize,
    Initialized,
    Ping,
    ResourcesList,
    ResourcesRead,
    ToolsList,
    ToolsCall,
    Unhandled(String),
}

impl Route {
    pub fn from_method(method: &str) -> Self {
        match method {
            methods::INITIALIZE => Route::Initialize,
            methods::INITIALIZED | methods::INITIALIZED_LEGACY => Route::Initialized,
            methods::PING => Route::Ping,
            methods::RESOURCES_LIST => Route::ResourcesList,
            methods::RESOURCES_READ => Route::ResourcesRead,
            methods::TOOLS_LIST => Route::ToolsList,
            methods::TOOLS_CALL => Route::ToolsCall,
            other => Route::Unhandled(other.to_string()),
        }
    }

    /// Whether a request on this route is answered.
    pub fn expects_reply(&self) -> bool {
        !matches!(self, Route::Initialized | Route::Unhandled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        assert_eq!(Route::from_method("tools/call"), Route::ToolsCall);
        assert_eq!(Route::from_method("initialized"), Route::Initialized);
        assert_eq!(
            Route::from_method("prompts/list"),
            Route::Unhandled("prompts/list".to_string())
        );
    }

    #[test]
    fn test_expects_reply() {
        assert!(Route::Ping.expects_reply());
        assert!(!Route::Initialized.expects_reply());
        assert!(!Route::from_method("").expects_reply());
    }
}
