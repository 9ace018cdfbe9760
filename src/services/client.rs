//! Dapp-side typed invoker.
//!
//! Encodes each method's parameters, submits the call through the
//! endpoint, and collapses the two-level error stream (remote method
//! errors vs. framing/transport errors) into one flat enumeration.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::domain::core::{
    AuthorizeResult, CommitmentLevel, Identity, PrivilegedMethod, SignAndSendTransactionsResult,
    SignPayloadsResult,
};
use crate::domain::error::{
    ERROR_AUTHORIZATION_FAILED, ERROR_INVALID_PAYLOAD, ERROR_NOT_COMMITTED, ERROR_NOT_SIGNED,
    ERROR_REAUTHORIZE,
};
use crate::domain::protocols::{contract, json_pack};
use crate::rpc::{CallError, RpcEndpoint, DEFAULT_PROTOCOL_TIMEOUT};

/// Flat error enumeration surfaced by [`MwaClient`] methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MwaClientError {
    #[error("request declined by the wallet")]
    Declined,

    #[error("auth_token requires reauthorization")]
    ReauthorizationRequired,

    #[error("authorization failed")]
    AuthorizationFailed,

    #[error("one or more payloads were invalid for signing")]
    InvalidPayloads { valid: Vec<bool> },

    #[error("one or more transactions did not reach the requested commitment level")]
    NotCommitted {
        signatures: Vec<Vec<u8>>,
        commitment: Vec<bool>,
    },

    #[error("remote endpoint replied with error {code}: {message}")]
    RemoteError {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request timed out")]
    Timeout,

    #[error("request was cancelled")]
    Cancelled,

    #[error("transport is closed")]
    Transport,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-method timeout. Defaults to 90 seconds.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_PROTOCOL_TIMEOUT,
        }
    }
}

/// The client-facing method surface, for callers that want to substitute
/// a test double for [`MwaClient`].
#[async_trait]
pub trait WalletAdapterClient: Send + Sync {
    async fn authorize(
        &self,
        identity: Option<Identity>,
        privileged_methods: &[PrivilegedMethod],
    ) -> Result<AuthorizeResult, MwaClientError>;

    async fn sign_transactions(
        &self,
        auth_token: &str,
        transactions: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError>;

    async fn sign_messages(
        &self,
        auth_token: &str,
        messages: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError>;

    async fn sign_and_send_transactions(
        &self,
        auth_token: &str,
        transactions: &[Vec<u8>],
        commitment: CommitmentLevel,
    ) -> Result<SignAndSendTransactionsResult, MwaClientError>;
}

/// Mobile Wallet Adapter client bound to an [`RpcEndpoint`].
pub struct MwaClient {
    endpoint: RpcEndpoint,
    config: ClientConfig,
}

impl MwaClient {
    pub fn new(endpoint: RpcEndpoint) -> Self {
        Self::with_config(endpoint, ClientConfig::default())
    }

    pub fn with_config(endpoint: RpcEndpoint, config: ClientConfig) -> Self {
        Self { endpoint, config }
    }

    /// Request authorization for the given identity and privileged methods.
    pub async fn authorize(
        &self,
        identity: Option<Identity>,
        privileged_methods: &[PrivilegedMethod],
    ) -> Result<AuthorizeResult, MwaClientError> {
        if privileged_methods.is_empty() {
            return Err(MwaClientError::InvalidInput(
                "at least one privileged method must be requested".to_string(),
            ));
        }
        if let Some(identity) = &identity {
            identity
                .validate()
                .map_err(|err| MwaClientError::InvalidInput(err.to_string()))?;
        }

        let mut params = Map::new();
        if let Some(identity) = identity {
            let encoded = serde_json::to_value(identity)
                .map_err(|err| MwaClientError::InvalidInput(err.to_string()))?;
            params.insert(contract::PARAMETER_IDENTITY.to_string(), encoded);
        }
        params.insert(
            contract::PARAMETER_PRIVILEGED_METHODS.to_string(),
            Value::Array(
                privileged_methods
                    .iter()
                    .map(|method| Value::String(method.method_name().to_string()))
                    .collect(),
            ),
        );

        let result = self
            .endpoint
            .call(
                contract::METHOD_AUTHORIZE,
                Some(Value::Object(params)),
                self.config.request_timeout,
            )
            .await
            .map_err(|err| translate_call_error(err, None, false))?;
        parse_authorize_result(result)
    }

    /// Sign the given transactions, returning one signed payload each.
    pub async fn sign_transactions(
        &self,
        auth_token: &str,
        transactions: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError> {
        self.sign_payloads(contract::METHOD_SIGN_TRANSACTION, auth_token, transactions)
            .await
    }

    /// Sign the given messages, returning one signed payload each.
    pub async fn sign_messages(
        &self,
        auth_token: &str,
        messages: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError> {
        self.sign_payloads(contract::METHOD_SIGN_MESSAGE, auth_token, messages)
            .await
    }

    /// Sign the given transactions and submit them at the requested
    /// commitment level, returning one signature each.
    pub async fn sign_and_send_transactions(
        &self,
        auth_token: &str,
        transactions: &[Vec<u8>],
        commitment: CommitmentLevel,
    ) -> Result<SignAndSendTransactionsResult, MwaClientError> {
        validate_sign_inputs(auth_token, transactions)?;

        let mut params = Map::new();
        params.insert(
            contract::PARAMETER_AUTH_TOKEN.to_string(),
            Value::String(auth_token.to_string()),
        );
        params.insert(
            contract::PARAMETER_PAYLOADS.to_string(),
            json_pack::pack_byte_arrays(transactions),
        );
        params.insert(
            contract::PARAMETER_COMMITMENT.to_string(),
            Value::String(commitment.as_str().to_string()),
        );

        let result = self
            .endpoint
            .call(
                contract::METHOD_SIGN_AND_SEND_TRANSACTION,
                Some(Value::Object(params)),
                self.config.request_timeout,
            )
            .await
            .map_err(|err| translate_call_error(err, Some(transactions.len()), true))?;
        let signatures =
            unpack_result_payloads(result, contract::RESULT_SIGNATURES, transactions.len())?;
        Ok(SignAndSendTransactionsResult { signatures })
    }

    async fn sign_payloads(
        &self,
        method: &'static str,
        auth_token: &str,
        payloads: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError> {
        validate_sign_inputs(auth_token, payloads)?;

        let mut params = Map::new();
        params.insert(
            contract::PARAMETER_AUTH_TOKEN.to_string(),
            Value::String(auth_token.to_string()),
        );
        params.insert(
            contract::PARAMETER_PAYLOADS.to_string(),
            json_pack::pack_byte_arrays(payloads),
        );

        let result = self
            .endpoint
            .call(
                method,
                Some(Value::Object(params)),
                self.config.request_timeout,
            )
            .await
            .map_err(|err| translate_call_error(err, Some(payloads.len()), false))?;
        let signed_payloads =
            unpack_result_payloads(result, contract::RESULT_SIGNED_PAYLOADS, payloads.len())?;
        Ok(SignPayloadsResult { signed_payloads })
    }
}

#[async_trait]
impl WalletAdapterClient for MwaClient {
    async fn authorize(
        &self,
        identity: Option<Identity>,
        privileged_methods: &[PrivilegedMethod],
    ) -> Result<AuthorizeResult, MwaClientError> {
        MwaClient::authorize(self, identity, privileged_methods).await
    }

    async fn sign_transactions(
        &self,
        auth_token: &str,
        transactions: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError> {
        MwaClient::sign_transactions(self, auth_token, transactions).await
    }

    async fn sign_messages(
        &self,
        auth_token: &str,
        messages: &[Vec<u8>],
    ) -> Result<SignPayloadsResult, MwaClientError> {
        MwaClient::sign_messages(self, auth_token, messages).await
    }

    async fn sign_and_send_transactions(
        &self,
        auth_token: &str,
        transactions: &[Vec<u8>],
        commitment: CommitmentLevel,
    ) -> Result<SignAndSendTransactionsResult, MwaClientError> {
        MwaClient::sign_and_send_transactions(self, auth_token, transactions, commitment).await
    }
}

fn validate_sign_inputs(auth_token: &str, payloads: &[Vec<u8>]) -> Result<(), MwaClientError> {
    if auth_token.is_empty() {
        return Err(MwaClientError::InvalidInput(
            "auth_token must not be empty".to_string(),
        ));
    }
    if payloads.is_empty() {
        return Err(MwaClientError::InvalidInput(
            "at least one payload is required".to_string(),
        ));
    }
    if payloads.iter().any(Vec::is_empty) {
        return Err(MwaClientError::InvalidInput(
            "payloads must not contain empty entries".to_string(),
        ));
    }
    Ok(())
}

fn invalid_response(message: impl Into<String>) -> MwaClientError {
    MwaClientError::InvalidResponse(message.into())
}

fn parse_authorize_result(result: Value) -> Result<AuthorizeResult, MwaClientError> {
    let Value::Object(o) = result else {
        return Err(invalid_response("expected result to be a JSON object"));
    };
    let auth_token = o
        .get(contract::RESULT_AUTH_TOKEN)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_response("expected an auth_token"))?
        .to_string();
    let public_key = o
        .get(contract::RESULT_PUBLIC_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_response("expected a public_key"))?
        .to_string();
    let wallet_uri_base = match o.get(contract::RESULT_WALLET_URI_BASE) {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(
            Url::parse(raw).map_err(|_| invalid_response("wallet_uri_base must be an absolute URI"))?,
        ),
        Some(_) => return Err(invalid_response("wallet_uri_base must be a string")),
    };
    Ok(AuthorizeResult {
        auth_token,
        public_key,
        wallet_uri_base,
    })
}

fn unpack_result_payloads(
    result: Value,
    key: &str,
    expected: usize,
) -> Result<Vec<Vec<u8>>, MwaClientError> {
    let Value::Object(o) = result else {
        return Err(invalid_response("expected result to be a JSON object"));
    };
    let Some(value) = o.get(key) else {
        return Err(invalid_response(format!("expected a {key} array")));
    };
    let payloads = json_pack::unpack_byte_arrays(value).map_err(|_| {
        invalid_response(format!("{key} must be an array of base64url-encoded strings"))
    })?;
    if payloads.len() != expected {
        return Err(invalid_response(format!(
            "{key} should contain {expected} entries; actual={}",
            payloads.len()
        )));
    }
    Ok(payloads)
}

fn translate_call_error(
    err: CallError,
    expected_payloads: Option<usize>,
    allow_not_committed: bool,
) -> MwaClientError {
    match err {
        CallError::Remote {
            code,
            message,
            data,
        } => match code {
            ERROR_NOT_SIGNED => MwaClientError::Declined,
            ERROR_REAUTHORIZE => MwaClientError::ReauthorizationRequired,
            ERROR_AUTHORIZATION_FAILED => MwaClientError::AuthorizationFailed,
            ERROR_INVALID_PAYLOAD => match expected_payloads {
                Some(expected) => parse_invalid_payloads_data(data, expected),
                None => MwaClientError::RemoteError {
                    code,
                    message,
                    data,
                },
            },
            ERROR_NOT_COMMITTED if allow_not_committed => match expected_payloads {
                Some(expected) => parse_not_committed_data(data, expected),
                None => MwaClientError::RemoteError {
                    code,
                    message,
                    data,
                },
            },
            _ => MwaClientError::RemoteError {
                code,
                message,
                data,
            },
        },
        CallError::Timeout => MwaClientError::Timeout,
        CallError::Cancelled => MwaClientError::Cancelled,
        CallError::Transport => MwaClientError::Transport,
    }
}

fn parse_invalid_payloads_data(data: Option<Value>, expected: usize) -> MwaClientError {
    let Some(Value::Object(o)) = data else {
        return invalid_response("invalid-payload error data must be a JSON object");
    };
    let Some(value) = o.get(contract::DATA_INVALID_PAYLOAD_VALID) else {
        return invalid_response("invalid-payload error data must contain a valid array");
    };
    match json_pack::unpack_booleans(value) {
        Ok(valid) if valid.len() == expected => MwaClientError::InvalidPayloads { valid },
        Ok(valid) => invalid_response(format!(
            "valid should contain {expected} entries; actual={}",
            valid.len()
        )),
        Err(_) => invalid_response("valid must be an array of booleans"),
    }
}

fn parse_not_committed_data(data: Option<Value>, expected: usize) -> MwaClientError {
    let Some(Value::Object(o)) = data else {
        return invalid_response("not-committed error data must be a JSON object");
    };
    let signatures = match o.get(contract::DATA_NOT_COMMITTED_SIGNATURES) {
        Some(value) => match json_pack::unpack_byte_arrays(value) {
            Ok(signatures) if signatures.len() == expected => signatures,
            Ok(signatures) => {
                return invalid_response(format!(
                    "signatures should contain {expected} entries; actual={}",
                    signatures.len()
                ));
            }
            Err(_) => {
                return invalid_response("signatures must be an array of base64url-encoded strings");
            }
        },
        None => return invalid_response("not-committed error data must contain signatures"),
    };
    let commitment = match o.get(contract::DATA_NOT_COMMITTED_COMMITMENT) {
        Some(value) => match json_pack::unpack_booleans(value) {
            Ok(commitment) if commitment.len() == expected => commitment,
            Ok(commitment) => {
                return invalid_response(format!(
                    "commitment should contain {expected} entries; actual={}",
                    commitment.len()
                ));
            }
            Err(_) => return invalid_response("commitment must be an array of booleans"),
        },
        None => return invalid_response("not-committed error data must contain commitment"),
    };
    MwaClientError::NotCommitted {
        signatures,
        commitment,
    }
}
