//! Wallet-side method dispatcher.
//!
//! Each inbound method is validated, turned into a typed request object,
//! and handed to the injected [`MethodHandlers`]. The wallet UI resolves
//! the request with a verdict; the registered completion maps the verdict
//! to the correct reply frame and enqueues it on the endpoint.

use std::fmt;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::domain::core::{AuthorizeResult, CommitmentLevel, Identity, PrivilegedMethod};
use crate::domain::error::{
    MwaError, ERROR_AUTHORIZATION_FAILED, ERROR_INVALID_PAYLOAD, ERROR_NOT_COMMITTED,
    ERROR_NOT_SIGNED, ERROR_REAUTHORIZE, INTERNAL_ERROR, METHOD_NOT_FOUND,
};
use crate::domain::protocols::{contract, json_pack};
use crate::port::MethodHandlers;
use crate::rpc::{PendingVerdict, ReplySink, RpcDispatcher};

/// Which signing method produced a [`SignPayloadsRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignType {
    Transaction,
    Message,
}

/// A handler bug detected while resolving a request: the verdict vectors
/// do not fit the request. The request is fatally resolved as an internal
/// failure; the violation never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerdictError {
    #[error("verdict vector length {actual} does not match the {expected} requested payloads")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid-payloads verdict must mark at least one payload invalid")]
    NoInvalidEntries,

    #[error("not-committed verdict must mark at least one transaction uncommitted")]
    NoUncommittedEntries,
}

pub(crate) enum AuthorizeVerdict {
    Completed(AuthorizeResult),
    Declined,
    InternalError,
}

pub(crate) enum SignVerdict {
    Signed(Vec<Vec<u8>>),
    Declined,
    ReauthorizationRequired,
    AuthTokenNotValid,
    InvalidPayloads(Vec<bool>),
    InternalError,
}

pub(crate) enum SignAndSendVerdict {
    Submitted(Vec<Vec<u8>>),
    Declined,
    ReauthorizationRequired,
    AuthTokenNotValid,
    InvalidPayloads(Vec<bool>),
    NotCommitted {
        signatures: Vec<Vec<u8>>,
        committed: Vec<bool>,
    },
    InternalError,
}

/// A pending `authorize` call. Exactly one `complete_*` call resolves it;
/// later calls are no-ops returning `false`.
pub struct AuthorizeRequest {
    identity: Option<Identity>,
    privileged_methods: Vec<PrivilegedMethod>,
    inner: PendingVerdict<AuthorizeVerdict>,
}

impl AuthorizeRequest {
    pub fn id(&self) -> &Value {
        self.inner.id()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn privileged_methods(&self) -> &[PrivilegedMethod] {
        &self.privileged_methods
    }

    pub fn complete(&self, result: AuthorizeResult) -> bool {
        self.inner.resolve(AuthorizeVerdict::Completed(result))
    }

    pub fn complete_with_decline(&self) -> bool {
        self.inner.resolve(AuthorizeVerdict::Declined)
    }
}

impl fmt::Debug for AuthorizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeRequest")
            .field("id", self.inner.id())
            .field("identity", &self.identity)
            .field("privileged_methods", &self.privileged_methods)
            .finish()
    }
}

/// A pending `sign_transaction` or `sign_message` call.
pub struct SignPayloadsRequest {
    sign_type: SignType,
    auth_token: String,
    payloads: Vec<Vec<u8>>,
    inner: PendingVerdict<SignVerdict>,
}

impl SignPayloadsRequest {
    pub fn id(&self) -> &Value {
        self.inner.id()
    }

    pub fn sign_type(&self) -> SignType {
        self.sign_type
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn payloads(&self) -> &[Vec<u8>] {
        &self.payloads
    }

    /// Resolve with signed payloads, one per requested payload.
    pub fn complete(&self, signed_payloads: Vec<Vec<u8>>) -> Result<bool, VerdictError> {
        if signed_payloads.len() != self.payloads.len() {
            let violation = VerdictError::LengthMismatch {
                expected: self.payloads.len(),
                actual: signed_payloads.len(),
            };
            self.inner.resolve(SignVerdict::InternalError);
            return Err(violation);
        }
        Ok(self.inner.resolve(SignVerdict::Signed(signed_payloads)))
    }

    pub fn complete_with_decline(&self) -> bool {
        self.inner.resolve(SignVerdict::Declined)
    }

    pub fn complete_with_reauthorization_required(&self) -> bool {
        self.inner.resolve(SignVerdict::ReauthorizationRequired)
    }

    pub fn complete_with_auth_token_not_valid(&self) -> bool {
        self.inner.resolve(SignVerdict::AuthTokenNotValid)
    }

    /// Resolve with per-payload validity; at least one entry must be false.
    pub fn complete_with_invalid_payloads(&self, valid: Vec<bool>) -> Result<bool, VerdictError> {
        if let Err(violation) = check_validity_vector(&valid, self.payloads.len()) {
            self.inner.resolve(SignVerdict::InternalError);
            return Err(violation);
        }
        Ok(self.inner.resolve(SignVerdict::InvalidPayloads(valid)))
    }
}

impl fmt::Debug for SignPayloadsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignPayloadsRequest")
            .field("id", self.inner.id())
            .field("sign_type", &self.sign_type)
            .field("num_payloads", &self.payloads.len())
            .finish()
    }
}

/// A pending `sign_and_send_transaction` call.
pub struct SignAndSendTransactionsRequest {
    auth_token: String,
    transactions: Vec<Vec<u8>>,
    commitment_level: CommitmentLevel,
    inner: PendingVerdict<SignAndSendVerdict>,
}

impl SignAndSendTransactionsRequest {
    pub fn id(&self) -> &Value {
        self.inner.id()
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    pub fn commitment_level(&self) -> CommitmentLevel {
        self.commitment_level
    }

    /// Resolve with transaction signatures, one per requested transaction.
    pub fn complete(&self, signatures: Vec<Vec<u8>>) -> Result<bool, VerdictError> {
        if signatures.len() != self.transactions.len() {
            let violation = VerdictError::LengthMismatch {
                expected: self.transactions.len(),
                actual: signatures.len(),
            };
            self.inner.resolve(SignAndSendVerdict::InternalError);
            return Err(violation);
        }
        Ok(self.inner.resolve(SignAndSendVerdict::Submitted(signatures)))
    }

    pub fn complete_with_decline(&self) -> bool {
        self.inner.resolve(SignAndSendVerdict::Declined)
    }

    pub fn complete_with_reauthorization_required(&self) -> bool {
        self.inner.resolve(SignAndSendVerdict::ReauthorizationRequired)
    }

    pub fn complete_with_auth_token_not_valid(&self) -> bool {
        self.inner.resolve(SignAndSendVerdict::AuthTokenNotValid)
    }

    pub fn complete_with_invalid_payloads(&self, valid: Vec<bool>) -> Result<bool, VerdictError> {
        if let Err(violation) = check_validity_vector(&valid, self.transactions.len()) {
            self.inner.resolve(SignAndSendVerdict::InternalError);
            return Err(violation);
        }
        Ok(self.inner.resolve(SignAndSendVerdict::InvalidPayloads(valid)))
    }

    /// Resolve with per-transaction signatures and commitment outcomes; at
    /// least one transaction must have missed the commitment level.
    pub fn complete_with_not_committed(
        &self,
        signatures: Vec<Vec<u8>>,
        committed: Vec<bool>,
    ) -> Result<bool, VerdictError> {
        let expected = self.transactions.len();
        let violation = if signatures.len() != expected {
            Some(VerdictError::LengthMismatch {
                expected,
                actual: signatures.len(),
            })
        } else if committed.len() != expected {
            Some(VerdictError::LengthMismatch {
                expected,
                actual: committed.len(),
            })
        } else if committed.iter().all(|c| *c) {
            Some(VerdictError::NoUncommittedEntries)
        } else {
            None
        };
        if let Some(violation) = violation {
            self.inner.resolve(SignAndSendVerdict::InternalError);
            return Err(violation);
        }
        Ok(self.inner.resolve(SignAndSendVerdict::NotCommitted {
            signatures,
            committed,
        }))
    }
}

impl fmt::Debug for SignAndSendTransactionsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignAndSendTransactionsRequest")
            .field("id", self.inner.id())
            .field("commitment_level", &self.commitment_level)
            .field("num_transactions", &self.transactions.len())
            .finish()
    }
}

fn check_validity_vector(valid: &[bool], expected: usize) -> Result<(), VerdictError> {
    if valid.len() != expected {
        return Err(VerdictError::LengthMismatch {
            expected,
            actual: valid.len(),
        });
    }
    if valid.iter().all(|v| *v) {
        return Err(VerdictError::NoInvalidEntries);
    }
    Ok(())
}

/// Mobile Wallet Adapter method dispatcher, installed on the wallet-side
/// endpoint.
pub struct MwaServer<H: MethodHandlers> {
    handlers: H,
}

impl<H: MethodHandlers> MwaServer<H> {
    pub fn new(handlers: H) -> Self {
        Self { handlers }
    }

    fn handle_authorize(&self, id: Value, params: Option<Value>, replies: &ReplySink) {
        let Some(params) = require_params_object(id.clone(), params, replies) else {
            return;
        };

        let identity = match parse_identity(&params) {
            Ok(identity) => identity,
            Err(err) => return reply_error(replies, id, err),
        };
        let privileged_methods = match parse_privileged_methods(&params) {
            Ok(methods) => methods,
            Err(err) => return reply_error(replies, id, err),
        };

        let request = AuthorizeRequest {
            identity,
            privileged_methods,
            inner: PendingVerdict::new(id, authorize_completion(replies.clone())),
        };
        self.handlers.authorize(request);
    }

    fn handle_sign_payloads(
        &self,
        sign_type: SignType,
        id: Value,
        params: Option<Value>,
        replies: &ReplySink,
    ) {
        let Some(params) = require_params_object(id.clone(), params, replies) else {
            return;
        };

        let auth_token = match parse_auth_token(&params) {
            Ok(token) => token,
            Err(err) => return reply_error(replies, id, err),
        };
        let payloads = match parse_payloads(&params) {
            Ok(payloads) => payloads,
            Err(err) => return reply_error(replies, id, err),
        };

        let request = SignPayloadsRequest {
            sign_type,
            auth_token,
            payloads,
            inner: PendingVerdict::new(id, sign_completion(replies.clone())),
        };
        self.handlers.sign_payloads(request);
    }

    fn handle_sign_and_send_transactions(
        &self,
        id: Value,
        params: Option<Value>,
        replies: &ReplySink,
    ) {
        let Some(params) = require_params_object(id.clone(), params, replies) else {
            return;
        };

        let auth_token = match parse_auth_token(&params) {
            Ok(token) => token,
            Err(err) => return reply_error(replies, id, err),
        };
        let transactions = match parse_payloads(&params) {
            Ok(payloads) => payloads,
            Err(err) => return reply_error(replies, id, err),
        };
        let commitment_level = match parse_commitment(&params) {
            Ok(level) => level,
            Err(err) => return reply_error(replies, id, err),
        };

        let request = SignAndSendTransactionsRequest {
            auth_token,
            transactions,
            commitment_level,
            inner: PendingVerdict::new(id, sign_and_send_completion(replies.clone())),
        };
        self.handlers.sign_and_send_transactions(request);
    }
}

impl<H: MethodHandlers> RpcDispatcher for MwaServer<H> {
    fn dispatch(&self, id: Value, method: &str, params: Option<Value>, replies: &ReplySink) {
        match method {
            contract::METHOD_AUTHORIZE => self.handle_authorize(id, params, replies),
            contract::METHOD_SIGN_TRANSACTION => {
                self.handle_sign_payloads(SignType::Transaction, id, params, replies)
            }
            contract::METHOD_SIGN_MESSAGE => {
                self.handle_sign_payloads(SignType::Message, id, params, replies)
            }
            contract::METHOD_SIGN_AND_SEND_TRANSACTION => {
                self.handle_sign_and_send_transactions(id, params, replies)
            }
            _ => {
                replies.reply_err(
                    id,
                    METHOD_NOT_FOUND,
                    format!("method '{method}' not available"),
                    None,
                );
            }
        }
    }
}

fn authorize_completion(replies: ReplySink) -> impl FnOnce(Value, AuthorizeVerdict) -> bool + Send {
    move |id, verdict| match verdict {
        AuthorizeVerdict::Completed(result) => {
            let mut o = Map::new();
            o.insert(
                contract::RESULT_AUTH_TOKEN.to_string(),
                Value::String(result.auth_token),
            );
            o.insert(
                contract::RESULT_PUBLIC_KEY.to_string(),
                Value::String(result.public_key),
            );
            if let Some(base) = result.wallet_uri_base {
                o.insert(
                    contract::RESULT_WALLET_URI_BASE.to_string(),
                    Value::String(base.to_string()),
                );
            }
            replies.reply_ok(id, Value::Object(o))
        }
        AuthorizeVerdict::Declined => replies.reply_err(
            id,
            ERROR_AUTHORIZATION_FAILED,
            "authorize request declined",
            None,
        ),
        AuthorizeVerdict::InternalError => replies.reply_err(
            id,
            INTERNAL_ERROR,
            "error while processing authorize request",
            None,
        ),
    }
}

fn sign_completion(replies: ReplySink) -> impl FnOnce(Value, SignVerdict) -> bool + Send {
    move |id, verdict| match verdict {
        SignVerdict::Signed(signed_payloads) => replies.reply_ok(
            id,
            json!({
                (contract::RESULT_SIGNED_PAYLOADS): json_pack::pack_byte_arrays(&signed_payloads)
            }),
        ),
        SignVerdict::Declined => {
            replies.reply_err(id, ERROR_NOT_SIGNED, "sign request declined", None)
        }
        SignVerdict::ReauthorizationRequired => replies.reply_err(
            id,
            ERROR_REAUTHORIZE,
            "auth_token requires reauthorization",
            None,
        ),
        SignVerdict::AuthTokenNotValid => replies.reply_err(
            id,
            ERROR_AUTHORIZATION_FAILED,
            "auth_token not valid for signing",
            None,
        ),
        SignVerdict::InvalidPayloads(valid) => replies.reply_err(
            id,
            ERROR_INVALID_PAYLOAD,
            "payload invalid for signing",
            Some(json!({
                (contract::DATA_INVALID_PAYLOAD_VALID): json_pack::pack_booleans(&valid)
            })),
        ),
        SignVerdict::InternalError => replies.reply_err(
            id,
            INTERNAL_ERROR,
            "error while processing sign request",
            None,
        ),
    }
}

fn sign_and_send_completion(
    replies: ReplySink,
) -> impl FnOnce(Value, SignAndSendVerdict) -> bool + Send {
    move |id, verdict| match verdict {
        SignAndSendVerdict::Submitted(signatures) => replies.reply_ok(
            id,
            json!({
                (contract::RESULT_SIGNATURES): json_pack::pack_byte_arrays(&signatures)
            }),
        ),
        SignAndSendVerdict::Declined => {
            replies.reply_err(id, ERROR_NOT_SIGNED, "sign request declined", None)
        }
        SignAndSendVerdict::ReauthorizationRequired => replies.reply_err(
            id,
            ERROR_REAUTHORIZE,
            "auth_token requires reauthorization",
            None,
        ),
        SignAndSendVerdict::AuthTokenNotValid => replies.reply_err(
            id,
            ERROR_AUTHORIZATION_FAILED,
            "auth_token not valid for signing",
            None,
        ),
        SignAndSendVerdict::InvalidPayloads(valid) => replies.reply_err(
            id,
            ERROR_INVALID_PAYLOAD,
            "payload invalid for signing",
            Some(json!({
                (contract::DATA_INVALID_PAYLOAD_VALID): json_pack::pack_booleans(&valid)
            })),
        ),
        SignAndSendVerdict::NotCommitted {
            signatures,
            committed,
        } => replies.reply_err(
            id,
            ERROR_NOT_COMMITTED,
            "transaction not committed",
            Some(json!({
                (contract::DATA_NOT_COMMITTED_SIGNATURES): json_pack::pack_byte_arrays(&signatures),
                (contract::DATA_NOT_COMMITTED_COMMITMENT): json_pack::pack_booleans(&committed)
            })),
        ),
        SignAndSendVerdict::InternalError => replies.reply_err(
            id,
            INTERNAL_ERROR,
            "error while processing sign request",
            None,
        ),
    }
}

fn require_params_object(
    id: Value,
    params: Option<Value>,
    replies: &ReplySink,
) -> Option<Map<String, Value>> {
    match params {
        Some(Value::Object(params)) => Some(params),
        _ => {
            reply_error(
                replies,
                id,
                MwaError::InvalidParams("params must be a JSON object".to_string()),
            );
            None
        }
    }
}

fn reply_error(replies: &ReplySink, id: Value, err: MwaError) {
    replies.reply_err(id, err.jsonrpc_code(), err.to_string(), None);
}

fn parse_identity(params: &Map<String, Value>) -> Result<Option<Identity>, MwaError> {
    match params.get(contract::PARAMETER_IDENTITY) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let identity: Identity = serde_json::from_value(value.clone()).map_err(|_| {
                MwaError::InvalidParams(
                    "identity must be an object with optional uri, icon, and name".to_string(),
                )
            })?;
            identity.validate()?;
            Ok(Some(identity))
        }
    }
}

fn parse_privileged_methods(params: &Map<String, Value>) -> Result<Vec<PrivilegedMethod>, MwaError> {
    let Some(Value::Array(entries)) = params.get(contract::PARAMETER_PRIVILEGED_METHODS) else {
        return Err(MwaError::InvalidParams(
            "privileged_methods must be a non-empty array of method names".to_string(),
        ));
    };
    if entries.is_empty() {
        return Err(MwaError::InvalidParams(
            "privileged_methods must be a non-empty array of method names".to_string(),
        ));
    }
    entries
        .iter()
        .map(|entry| {
            let name = entry.as_str().ok_or_else(|| {
                MwaError::InvalidParams("privileged_methods entries must be strings".to_string())
            })?;
            PrivilegedMethod::from_method_name(name).ok_or_else(|| {
                MwaError::InvalidParams(format!(
                    "privileged_methods contains unknown method name '{name}'"
                ))
            })
        })
        .collect()
}

fn parse_auth_token(params: &Map<String, Value>) -> Result<String, MwaError> {
    params
        .get(contract::PARAMETER_AUTH_TOKEN)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| MwaError::InvalidParams("request must contain an auth_token".to_string()))
}

fn parse_payloads(params: &Map<String, Value>) -> Result<Vec<Vec<u8>>, MwaError> {
    let Some(value) = params.get(contract::PARAMETER_PAYLOADS) else {
        return Err(MwaError::InvalidParams(
            "request must contain an array of payloads to sign".to_string(),
        ));
    };
    let payloads = json_pack::unpack_byte_arrays(value).map_err(|_| {
        MwaError::InvalidParams("payloads must be an array of base64url-encoded strings".to_string())
    })?;
    if payloads.is_empty() {
        return Err(MwaError::InvalidParams(
            "request must contain at least one payload to sign".to_string(),
        ));
    }
    if payloads.iter().any(Vec::is_empty) {
        return Err(MwaError::InvalidParams(
            "payloads entries must not be empty".to_string(),
        ));
    }
    Ok(payloads)
}

fn parse_commitment(params: &Map<String, Value>) -> Result<CommitmentLevel, MwaError> {
    params
        .get(contract::PARAMETER_COMMITMENT)
        .and_then(Value::as_str)
        .and_then(CommitmentLevel::from_commitment_level)
        .ok_or_else(|| MwaError::InvalidParams("request contains an invalid commitment".to_string()))
}
