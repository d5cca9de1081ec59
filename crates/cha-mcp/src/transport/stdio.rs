//! Stdio transport: reads JSON-RPC from stdin, writes to stdout.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::McpResult;

use super::framing::{self, LineDecoder};

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop. Reads from stdin, writes to stdout.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Stdio transport started");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one peer over an arbitrary byte stream pair.
    ///
    /// Each document is dispatched to completion and its reply flushed before
    /// the next line is read, so replies leave in request order.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut decoder = LineDecoder::new(BufReader::new(reader));

        while let Some(value) = decoder.next_value().await? {
            if let Some(response) = self.handler.handle_message(value).await {
                let framed = framing::frame_message(&response)?;
                writer.write_all(framed.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("EOF on input, shutting down");
        Ok(())
    }
}
