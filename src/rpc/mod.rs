//! JSON-RPC engine: the duplex endpoint and the pending-verdict slot.

mod endpoint;
mod pending;

pub use endpoint::{
    CallError, MethodCall, ReplySink, RpcDispatcher, RpcEndpoint, DEFAULT_PROTOCOL_TIMEOUT,
};
pub(crate) use pending::PendingVerdict;

#[cfg(test)]
pub(crate) use endpoint::{take_reply, test_reply_sink};
