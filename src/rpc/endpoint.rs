use std::collections::HashMap;
use std::future::{Future, IntoFuture};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use futures::future::BoxFuture;
use futures::io::BufReader;
use futures::{
    select_biased, AsyncBufReadExt as _, AsyncRead, AsyncWrite, AsyncWriteExt as _, FutureExt as _,
    StreamExt as _,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, trace, warn};

use crate::domain::error::{MwaError, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
use crate::domain::protocols::json_rpc::{
    decode_frame, Frame, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
};

/// Default per-call timeout for protocol methods.
pub const DEFAULT_PROTOCOL_TIMEOUT: Duration = Duration::from_secs(90);

/// Outcome of an outbound method call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("remote endpoint replied with error {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("method call timed out")]
    Timeout,

    #[error("method call was cancelled")]
    Cancelled,

    #[error("transport is closed")]
    Transport,
}

/// Receives each inbound request frame, in arrival order, on the endpoint
/// io task. Implementations must eventually reply through the provided
/// [`ReplySink`] exactly once per request, though not necessarily before
/// returning.
///
/// The unit type is the null dispatcher for pure-client endpoints: it
/// replies method-not-found to everything.
pub trait RpcDispatcher: Send + 'static {
    fn dispatch(&self, id: Value, method: &str, params: Option<Value>, replies: &ReplySink);
}

impl RpcDispatcher for () {
    fn dispatch(&self, id: Value, method: &str, _params: Option<Value>, replies: &ReplySink) {
        replies.reply_err(
            id,
            METHOD_NOT_FOUND,
            format!("method '{method}' not available"),
            None,
        );
    }
}

pub(crate) enum Outbound {
    Call { id: i64, frame: JsonRpcRequest },
    Reply(JsonRpcResponse),
    Close,
}

type PendingMap = HashMap<i64, oneshot::Sender<Result<Value, CallError>>>;

/// Enqueues reply frames onto the endpoint's outgoing stream.
///
/// Cheap to clone; replies may be issued from any thread and in any order.
/// Both methods return `false` once the transport is gone.
#[derive(Clone)]
pub struct ReplySink {
    tx: UnboundedSender<Outbound>,
}

impl ReplySink {
    pub fn reply_ok(&self, id: Value, result: Value) -> bool {
        self.tx
            .unbounded_send(Outbound::Reply(JsonRpcResponse::success(id, result)))
            .is_ok()
    }

    pub fn reply_err(
        &self,
        id: Value,
        code: i64,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> bool {
        self.tx
            .unbounded_send(Outbound::Reply(JsonRpcResponse::error(
                id,
                JsonRpcError {
                    code,
                    message: message.into(),
                    data,
                },
            )))
            .is_ok()
    }
}

/// A full-duplex JSON-RPC 2.0 endpoint over a byte stream.
///
/// Outbound calls are correlated by a monotonically increasing integer id
/// and resolved by a matching response frame, a per-call timer, explicit
/// cancellation, or transport loss. Inbound request frames are handed to
/// the installed [`RpcDispatcher`] while outbound calls are pending, so
/// both sides may pipeline.
///
/// Construction returns the endpoint handle together with the io task
/// future; the caller decides where that future runs.
#[derive(Clone)]
pub struct RpcEndpoint {
    outgoing_tx: UnboundedSender<Outbound>,
    pending: Arc<Mutex<PendingMap>>,
    next_id: Arc<AtomicI64>,
}

impl RpcEndpoint {
    pub fn new<D>(
        dispatcher: D,
        outgoing_bytes: impl AsyncWrite + Unpin,
        incoming_bytes: impl AsyncRead + Unpin,
    ) -> (Self, impl Future<Output = Result<(), MwaError>>)
    where
        D: RpcDispatcher,
    {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded();
        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));

        let endpoint = Self {
            outgoing_tx: outgoing_tx.clone(),
            pending: pending.clone(),
            next_id: Arc::new(AtomicI64::new(1)),
        };

        let replies = ReplySink { tx: outgoing_tx };
        let io_task = {
            let pending = pending.clone();
            async move {
                let result = run_io(
                    dispatcher,
                    replies,
                    outgoing_rx,
                    outgoing_bytes,
                    incoming_bytes,
                    pending.clone(),
                )
                .await;
                for (_, tx) in pending.lock().unwrap().drain() {
                    tx.send(Err(CallError::Cancelled)).ok();
                }
                result
            }
        };

        (endpoint, io_task)
    }

    /// Issue an outbound method call. The frame is emitted by the io task;
    /// awaiting the returned [`MethodCall`] resolves it.
    pub fn call(&self, method: &str, params: Option<Value>, timeout: Duration) -> MethodCall {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);

        let frame = JsonRpcRequest::new(Value::from(id), method, params);
        if self
            .outgoing_tx
            .unbounded_send(Outbound::Call { id, frame })
            .is_err()
        {
            if let Some(tx) = self.pending.lock().unwrap().remove(&id) {
                tx.send(Err(CallError::Transport)).ok();
            }
        }

        MethodCall {
            id,
            rx,
            timeout,
            pending: self.pending.clone(),
        }
    }

    /// Cancel a pending outbound call by id. Idempotent; a call cancelled
    /// before the io task wrote its frame emits nothing.
    pub fn cancel_call(&self, id: i64) {
        if let Some(tx) = self.pending.lock().unwrap().remove(&id) {
            tx.send(Err(CallError::Cancelled)).ok();
        }
    }

    /// Stop the io task. All pending outbound calls resolve `Cancelled`;
    /// replies for still-open inbound requests are discarded.
    pub fn close(&self) {
        self.outgoing_tx.unbounded_send(Outbound::Close).ok();
    }
}

/// A pending outbound method call.
///
/// Await it (it implements [`IntoFuture`]) to obtain the result, or call
/// [`MethodCall::cancel`] to resolve it `Cancelled`.
pub struct MethodCall {
    id: i64,
    rx: oneshot::Receiver<Result<Value, CallError>>,
    timeout: Duration,
    pending: Arc<Mutex<PendingMap>>,
}

impl MethodCall {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn cancel(&self) {
        if let Some(tx) = self.pending.lock().unwrap().remove(&self.id) {
            tx.send(Err(CallError::Cancelled)).ok();
        }
    }
}

impl IntoFuture for MethodCall {
    type Output = Result<Value, CallError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let MethodCall {
            id,
            rx,
            timeout,
            pending,
        } = self;
        async move {
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(CallError::Cancelled),
                Err(_) => {
                    // Forget the call so a late reply is dropped, not delivered.
                    pending.lock().unwrap().remove(&id);
                    Err(CallError::Timeout)
                }
            }
        }
        .boxed()
    }
}

async fn run_io<D: RpcDispatcher>(
    dispatcher: D,
    replies: ReplySink,
    mut outgoing_rx: UnboundedReceiver<Outbound>,
    mut outgoing_bytes: impl AsyncWrite + Unpin,
    incoming_bytes: impl AsyncRead + Unpin,
    pending: Arc<Mutex<PendingMap>>,
) -> Result<(), MwaError> {
    let mut reader = BufReader::new(incoming_bytes);
    let mut outgoing_line = Vec::new();
    let mut incoming_line = String::new();

    loop {
        select_biased! {
            message = outgoing_rx.next() => {
                match message {
                    Some(Outbound::Call { id, frame }) => {
                        if !pending.lock().unwrap().contains_key(&id) {
                            trace!(id, "dropping call frame cancelled before send");
                            continue;
                        }
                        write_frame(&mut outgoing_bytes, &mut outgoing_line, &frame).await?;
                    }
                    Some(Outbound::Reply(frame)) => {
                        write_frame(&mut outgoing_bytes, &mut outgoing_line, &frame).await?;
                    }
                    Some(Outbound::Close) | None => break,
                }
            }
            read = reader.read_line(&mut incoming_line).fuse() => {
                if read? == 0 {
                    break;
                }
                trace!(frame = incoming_line.trim_end(), "recv");
                handle_inbound(&dispatcher, &replies, &pending, &incoming_line);
                incoming_line.clear();
            }
        }
    }

    Ok(())
}

async fn write_frame(
    outgoing_bytes: &mut (impl AsyncWrite + Unpin),
    line: &mut Vec<u8>,
    frame: &impl serde::Serialize,
) -> Result<(), MwaError> {
    line.clear();
    serde_json::to_writer(&mut *line, frame)?;
    trace!(frame = String::from_utf8_lossy(line).as_ref(), "send");
    line.push(b'\n');
    // Write failures surface as EOF on the read side.
    outgoing_bytes.write_all(line).await.ok();
    Ok(())
}

fn handle_inbound<D: RpcDispatcher>(
    dispatcher: &D,
    replies: &ReplySink,
    pending: &Arc<Mutex<PendingMap>>,
    raw: &str,
) {
    match decode_frame(raw) {
        Ok(Frame::Request { id, method, params }) => {
            dispatcher.dispatch(id, &method, params, replies);
        }
        Ok(Frame::Notification { method, .. }) => {
            warn!(%method, "ignoring notification frame");
        }
        Ok(Frame::Response { id, result }) => {
            resolve_pending(pending, &id, Ok(result));
        }
        Ok(Frame::ErrorResponse { id, error }) => {
            resolve_pending(
                pending,
                &id,
                Err(CallError::Remote {
                    code: error.code,
                    message: error.message,
                    data: error.data,
                }),
            );
        }
        Err(err @ MwaError::JsonParse(_)) => {
            error!(%err, "failed to parse inbound frame");
            replies.reply_err(Value::Null, PARSE_ERROR, "invalid JSON payload", None);
        }
        Err(err) => {
            error!(%err, "rejecting malformed inbound frame");
            replies.reply_err(
                Value::Null,
                INVALID_REQUEST,
                "invalid JSON-RPC 2.0 frame",
                None,
            );
        }
    }
}

fn resolve_pending(
    pending: &Arc<Mutex<PendingMap>>,
    id: &Value,
    outcome: Result<Value, CallError>,
) {
    let Some(key) = id.as_i64() else {
        warn!(?id, "dropping response with a non-numeric id");
        return;
    };
    match pending.lock().unwrap().remove(&key) {
        Some(tx) => {
            tx.send(outcome).ok();
        }
        None => warn!(id = key, "dropping response for unknown or completed request id"),
    }
}

#[cfg(test)]
pub(crate) fn test_reply_sink() -> (ReplySink, UnboundedReceiver<Outbound>) {
    let (tx, rx) = mpsc::unbounded();
    (ReplySink { tx }, rx)
}

#[cfg(test)]
pub(crate) fn take_reply(rx: &mut UnboundedReceiver<Outbound>) -> Option<JsonRpcResponse> {
    match rx.try_next() {
        Ok(Some(Outbound::Reply(frame))) => Some(frame),
        _ => None,
    }
}
