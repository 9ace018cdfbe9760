use std::sync::Mutex;

use serde_json::Value;

/// One-shot resolve slot for an inbound request awaiting its verdict.
///
/// Holds the originating request id and a completion callback that maps
/// the verdict to a reply frame and enqueues it on the endpoint's
/// outgoing stream, so observers always see completion on the endpoint
/// task. The first [`resolve`](Self::resolve) consumes the callback;
/// every later call is a no-op returning `false`.
pub(crate) struct PendingVerdict<V> {
    id: Value,
    on_complete: Mutex<Option<Box<dyn FnOnce(Value, V) -> bool + Send>>>,
}

impl<V> PendingVerdict<V> {
    pub(crate) fn new(id: Value, on_complete: impl FnOnce(Value, V) -> bool + Send + 'static) -> Self {
        Self {
            id,
            on_complete: Mutex::new(Some(Box::new(on_complete))),
        }
    }

    pub(crate) fn id(&self) -> &Value {
        &self.id
    }

    /// Resolve with a verdict. Returns `true` only for the first call on
    /// a live transport.
    pub(crate) fn resolve(&self, verdict: V) -> bool {
        let callback = self.on_complete.lock().unwrap().take();
        match callback {
            Some(callback) => callback(self.id.clone(), verdict),
            None => false,
        }
    }
}
