//! Request/response correlation over a single duplex byte stream.
//!
//! Every outbound request gets the next `u64` id (starting at 0, never
//! reused) and a oneshot slot in the pending map. A background task decodes
//! inbound lines and resolves slots strictly by `id`, so replies may arrive in
//! any order. When the inbound stream ends, every outstanding slot fails with
//! [`McpError::ConnectionClosed`] and later calls fail immediately.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::transport::framing::{self, LineDecoder};
use crate::types::{
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, McpError, McpResult, RequestId,
};

type Reply = McpResult<Value>;

#[derive(Default)]
struct Pending {
    calls: HashMap<u64, oneshot::Sender<Reply>>,
    closed: bool,
}

impl Pending {
    fn close(&mut self) {
        self.closed = true;
        for (id, tx) in self.calls.drain() {
            tracing::debug!("Failing pending call {id}: connection closed");
            let _ = tx.send(Err(McpError::ConnectionClosed));
        }
    }
}

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Async JSON-RPC 2.0 client bound to one reader/writer pair.
pub struct JsonRpcClient {
    next_id: AtomicU64,
    pending: Arc<Mutex<Pending>>,
    writer: Mutex<Writer>,
    read_loop: JoinHandle<()>,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl JsonRpcClient {
    /// Wire a client to a peer and start the read loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending = Arc::new(Mutex::new(Pending::default()));
        let decoder = LineDecoder::new(BufReader::new(reader));
        let read_loop = tokio::spawn(read_loop(decoder, Arc::clone(&pending)));

        Self {
            next_id: AtomicU64::new(0),
            pending,
            writer: Mutex::new(Box::new(writer)),
            read_loop,
        }
    }

    /// The id the next request will carry.
    pub fn peek_next_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    /// Send a request and wait for its reply, however long it takes.
    ///
    /// Error replies surface as [`McpError::Rpc`].
    pub async fn call(&self, method: &str, params: impl Serialize) -> McpResult<Value> {
        let (_, rx) = self.send_request(method, params).await?;
        rx.await.unwrap_or(Err(McpError::ConnectionClosed))
    }

    /// Like [`call`](Self::call) but gives up after `timeout`, releasing the
    /// pending slot. A late reply for that id is then discarded.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: impl Serialize,
        timeout: Duration,
    ) -> McpResult<Value> {
        let (id, rx) = self.send_request(method, params).await?;
        match tokio::time::timeout(timeout, rx).await {
            Ok(reply) => reply.unwrap_or(Err(McpError::ConnectionClosed)),
            Err(_) => {
                self.pending.lock().await.calls.remove(&id);
                Err(McpError::Timeout(method.to_string()))
            }
        }
    }

    /// Send a notification. No reply is expected or awaited.
    pub async fn notify(&self, method: &str, params: impl Serialize) -> McpResult<()> {
        let notification =
            JsonRpcNotification::new(method.to_string(), Some(serde_json::to_value(params)?));
        self.write(&notification).await
    }

    async fn send_request(
        &self,
        method: &str,
        params: impl Serialize,
    ) -> McpResult<(u64, oneshot::Receiver<Reply>)> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let params = serde_json::to_value(params)?;

        // Register before writing so a fast reply always finds its slot.
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                return Err(McpError::ConnectionClosed);
            }
            pending.calls.insert(id, tx);
        }

        let request = JsonRpcRequest::new(RequestId::from(id), method.to_string(), Some(params));
        tracing::debug!("-> {method} (id {id})");

        if let Err(e) = self.write(&request).await {
            self.pending.lock().await.calls.remove(&id);
            return Err(e);
        }

        Ok((id, rx))
    }

    async fn write(&self, message: &impl Serialize) -> McpResult<()> {
        let framed = framing::frame_message(message)?;
        let mut writer = self.writer.lock().await;
        let result = async {
            writer.write_all(framed.as_bytes()).await?;
            writer.flush().await
        }
        .await;

        result.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => McpError::ConnectionClosed,
            _ => McpError::Io(e),
        })
    }
}

impl Drop for JsonRpcClient {
    fn drop(&mut self) {
        self.read_loop.abort();
    }
}

async fn read_loop<R>(mut decoder: LineDecoder<R>, pending: Arc<Mutex<Pending>>)
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        match decoder.next_value().await {
            Ok(Some(value)) => resolve(value, &pending).await,
            Ok(None) => {
                tracing::debug!("Peer closed the stream");
                break;
            }
            Err(e) => {
                tracing::warn!("Read loop stopped: {e}");
                break;
            }
        }
    }

    pending.lock().await.close();
}

async fn resolve(value: Value, pending: &Mutex<Pending>) {
    let (id, reply) = match JsonRpcMessage::from_value(value) {
        Ok(JsonRpcMessage::Response(resp)) => (resp.id, Ok(resp.result)),
        Ok(JsonRpcMessage::Error(err)) => (err.id, Err(McpError::from(err.error))),
        Ok(JsonRpcMessage::Notification(notif)) => {
            tracing::debug!("Ignoring server notification: {}", notif.method);
            return;
        }
        Ok(JsonRpcMessage::Request(req)) => {
            tracing::warn!("Ignoring server-initiated request: {}", req.method);
            return;
        }
        Err(e) => {
            tracing::warn!("Ignoring unrecognized message: {e}");
            return;
        }
    };

    let Some(id_num) = id.as_u64() else {
        tracing::warn!("Reply has non-integer id: {id}");
        return;
    };

    let tx = pending.lock().await.calls.remove(&id_num);
    match tx {
        Some(tx) => {
            tracing::debug!("<- reply (id {id_num})");
            let _ = tx.send(reply);
        }
        None => tracing::debug!("Reply for unknown id {id_num}; ignoring"),
    }
}
