//! Packing between JSON wire fields and native byte/boolean vectors.
//!
//! Byte arrays travel as unpadded base64url strings.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

use crate::domain::error::MwaError;

/// Pack byte arrays into a JSON array of unpadded base64url strings.
pub fn pack_byte_arrays(arrays: &[Vec<u8>]) -> Value {
    Value::Array(
        arrays
            .iter()
            .map(|bytes| Value::String(URL_SAFE_NO_PAD.encode(bytes)))
            .collect(),
    )
}

/// Unpack a JSON array of base64url strings into byte arrays.
pub fn unpack_byte_arrays(value: &Value) -> Result<Vec<Vec<u8>>, MwaError> {
    let Value::Array(items) = value else {
        return Err(MwaError::MalformedEncoding(
            "expected a JSON array of base64url strings".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| {
            let Value::String(encoded) = item else {
                return Err(MwaError::MalformedEncoding(
                    "array elements must be base64url strings".to_string(),
                ));
            };
            URL_SAFE_NO_PAD
                .decode(encoded)
                .map_err(|err| MwaError::MalformedEncoding(format!("invalid base64url string: {err}")))
        })
        .collect()
}

/// Pack booleans into a JSON array.
pub fn pack_booleans(values: &[bool]) -> Value {
    Value::Array(values.iter().copied().map(Value::Bool).collect())
}

/// Unpack a JSON array of booleans.
pub fn unpack_booleans(value: &Value) -> Result<Vec<bool>, MwaError> {
    let Value::Array(items) = value else {
        return Err(MwaError::MalformedEncoding(
            "expected a JSON array of booleans".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| {
            item.as_bool().ok_or_else(|| {
                MwaError::MalformedEncoding("array elements must be booleans".to_string())
            })
        })
        .collect()
}
