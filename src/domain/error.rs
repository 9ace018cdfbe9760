use serde_json::{json, Value};
use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Mobile Wallet Adapter error codes, fixed outside the reserved JSON-RPC range
pub const ERROR_AUTHORIZATION_FAILED: i64 = -1;
pub const ERROR_REAUTHORIZE: i64 = -2;
pub const ERROR_NOT_SIGNED: i64 = -3;
pub const ERROR_INVALID_PAYLOAD: i64 = -4;
pub const ERROR_NOT_COMMITTED: i64 = -5;

/// Error type shared by the protocol core.
///
/// Variants map onto JSON-RPC error codes via [`MwaError::jsonrpc_code`];
/// the wallet-side dispatcher uses that mapping to reply without leaking
/// internal detail to the remote peer.
#[derive(Error, Debug)]
pub enum MwaError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MwaError {
    /// The JSON-RPC error code this error maps to on the wire.
    pub fn jsonrpc_code(&self) -> i64 {
        match self {
            MwaError::JsonParse(_) => PARSE_ERROR,
            MwaError::InvalidRequest(_) => INVALID_REQUEST,
            MwaError::MethodNotFound(_) => METHOD_NOT_FOUND,
            MwaError::InvalidParams(_) | MwaError::MalformedEncoding(_) => INVALID_PARAMS,
            MwaError::Internal(_) | MwaError::Io(_) => INTERNAL_ERROR,
        }
    }

    /// Convert to a JSON-RPC error value suitable for an error reply.
    pub fn to_jsonrpc_error(&self) -> Value {
        json!({
            "code": self.jsonrpc_code(),
            "message": self.to_string(),
        })
    }
}
