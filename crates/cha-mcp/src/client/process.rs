//! Spawn the server as a child process and talk to it over its stdio.

use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::config::ServerCommand;
use crate::types::{McpError, McpResult};

use super::session::McpClient;

/// A running server child process. Killed when dropped.
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
}

impl ServerProcess {
    /// Start `command` with piped stdin/stdout and inherited stderr, and
    /// return a client wired to it.
    pub fn spawn(command: &ServerCommand) -> McpResult<(Self, McpClient)> {
        tracing::debug!("Spawning server: {command}");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::InternalError("child stdin not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::InternalError("child stdout not piped".to_string()))?;

        Ok((Self { child }, McpClient::connect(stdout, stdin)))
    }

    /// Stop the child and reap it.
    pub async fn shutdown(mut self) -> McpResult<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }
        Ok(())
    }
}
