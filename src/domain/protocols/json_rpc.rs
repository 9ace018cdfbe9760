use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::MwaError;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Value, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A classified inbound frame.
#[derive(Debug)]
pub enum Frame {
    Request {
        id: Value,
        method: String,
        params: Option<Value>,
    },
    Notification {
        method: String,
        params: Option<Value>,
    },
    Response {
        id: Value,
        result: Value,
    },
    ErrorResponse {
        id: Value,
        error: JsonRpcError,
    },
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: Option<String>,
    params: Option<Value>,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

/// Parse and classify one wire frame.
///
/// A frame whose `jsonrpc` member is missing or not `"2.0"` is rejected,
/// as is one carrying neither `method` nor `id`. A response without a
/// `result` or `error` member yields a `null` result.
pub fn decode_frame(raw: &str) -> Result<Frame, MwaError> {
    let frame: RawFrame = serde_json::from_str(raw)?;

    if frame.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
        return Err(MwaError::InvalidRequest(
            "jsonrpc member must be \"2.0\"".to_string(),
        ));
    }

    match (frame.id, frame.method) {
        (Some(id), Some(method)) => Ok(Frame::Request {
            id,
            method,
            params: frame.params,
        }),
        (None, Some(method)) => Ok(Frame::Notification {
            method,
            params: frame.params,
        }),
        (Some(id), None) => match (frame.result, frame.error) {
            (Some(result), _) => Ok(Frame::Response { id, result }),
            (None, Some(error)) => Ok(Frame::ErrorResponse { id, error }),
            (None, None) => Ok(Frame::Response {
                id,
                result: Value::Null,
            }),
        },
        (None, None) => Err(MwaError::InvalidRequest(
            "frame carries neither an id nor a method".to_string(),
        )),
    }
}
