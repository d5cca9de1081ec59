//! Message framing for newline-delimited JSON.
//!
//! Inbound text is split on `\n`; each complete line is parsed as one JSON
//! document. Corrupt lines are logged and skipped so that a single bad line
//! never ends the stream. A trailing line without its newline (the peer died
//! mid-write) is dropped.

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::types::{McpError, McpResult};

/// Parse a single line of text as a JSON document.
pub fn parse_line(line: &str) -> McpResult<Value> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a message to a JSON line (with trailing newline).
pub fn frame_message(value: &impl Serialize) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Lazily decodes newline-delimited JSON documents from a byte stream.
pub struct LineDecoder<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Read the next well-formed JSON document.
    ///
    /// Returns `Ok(None)` once the stream is closed. Only I/O failures are
    /// surfaced as errors.
    pub async fn next_value(&mut self) -> McpResult<Option<Value>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf).await?;

            if n == 0 {
                return Ok(None);
            }

            if self.buf.last() != Some(&b'\n') {
                tracing::debug!("Dropping partial final line ({n} bytes)");
                return Ok(None);
            }

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Skipping non UTF-8 line: {e}");
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => tracing::warn!("Skipping malformed line: {e}"),
            }
        }
    }
}
