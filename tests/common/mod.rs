//! Shared test wallet for integration tests.
//!
//! Bundles an in-memory token issuer, a deterministic signer, and a
//! scriptable submitter behind `MethodHandlers`, resolving every request
//! on a spawned task so verdicts cross task boundaries like they would
//! in a real wallet.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

use mwa_rs::{
    AuthTokenIssuer, AuthTokenStatus, AuthorizeRequest, ClientConfig, CommitmentLevel, Identity,
    IssuedAuthorization, MethodHandlers, MwaClient, MwaError, MwaServer, PayloadSigner,
    RpcEndpoint, SignAndSendTransactionsRequest, SignPayloadsRequest, SignerError, Submission,
    TransactionSubmitter,
};

pub const AUTH_TOKEN: &str = "tok";
pub const STALE_AUTH_TOKEN: &str = "stale";
pub const PUBLIC_KEY: &str = "pk";

/// Deterministic stand-in signature: bitwise complement of the payload.
pub fn invert(payload: &[u8]) -> Vec<u8> {
    payload.iter().map(|b| !b).collect()
}

pub struct StaticIssuer;

#[async_trait]
impl AuthTokenIssuer for StaticIssuer {
    async fn issue(&self, _identity: Option<&Identity>) -> Result<IssuedAuthorization, MwaError> {
        Ok(IssuedAuthorization {
            auth_token: AUTH_TOKEN.to_string(),
            public_key: PUBLIC_KEY.to_string(),
            wallet_uri_base: None,
        })
    }

    async fn validate(&self, auth_token: &str) -> AuthTokenStatus {
        match auth_token {
            AUTH_TOKEN => AuthTokenStatus::Valid,
            STALE_AUTH_TOKEN => AuthTokenStatus::ReauthorizationRequired,
            _ => AuthTokenStatus::Invalid,
        }
    }
}

pub struct InvertSigner;

#[async_trait]
impl PayloadSigner for InvertSigner {
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(invert(payload))
    }
}

/// Submits each transaction in request order; commitment outcomes follow
/// the configured pattern, defaulting to committed.
pub struct PatternSubmitter {
    committed: Vec<bool>,
    next: Mutex<usize>,
}

impl PatternSubmitter {
    pub fn new(committed: Vec<bool>) -> Self {
        Self {
            committed,
            next: Mutex::new(0),
        }
    }

    pub fn all_committed() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl TransactionSubmitter for PatternSubmitter {
    async fn submit(
        &self,
        signed_transaction: &[u8],
        _commitment: CommitmentLevel,
    ) -> Result<Submission, SignerError> {
        let index = {
            let mut next = self.next.lock().unwrap();
            let index = *next;
            *next += 1;
            index
        };
        Ok(Submission {
            signature: signed_transaction.to_vec(),
            committed: self.committed.get(index).copied().unwrap_or(true),
        })
    }
}

#[derive(Clone)]
pub enum WalletMode {
    /// Validate the token, then sign (and submit) every payload.
    Approve,
    /// Decline everything.
    Decline,
    /// Report the given per-payload validity vector.
    InvalidPayloads(Vec<bool>),
    /// Stash requests without resolving them.
    Ignore,
}

struct WalletState {
    issuer: StaticIssuer,
    signer: InvertSigner,
    submitter: PatternSubmitter,
    mode: Mutex<WalletMode>,
    stashed_sign: Mutex<Vec<SignPayloadsRequest>>,
    stashed_authorize: Mutex<Vec<AuthorizeRequest>>,
}

#[derive(Clone)]
pub struct TestWallet {
    inner: Arc<WalletState>,
}

impl TestWallet {
    pub fn new(mode: WalletMode) -> Self {
        Self::with_submitter(mode, PatternSubmitter::all_committed())
    }

    pub fn with_submitter(mode: WalletMode, submitter: PatternSubmitter) -> Self {
        Self {
            inner: Arc::new(WalletState {
                issuer: StaticIssuer,
                signer: InvertSigner,
                submitter,
                mode: Mutex::new(mode),
                stashed_sign: Mutex::new(Vec::new()),
                stashed_authorize: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn set_mode(&self, mode: WalletMode) {
        *self.inner.mode.lock().unwrap() = mode;
    }

    /// Wait until `count` sign requests are stashed, then take them all.
    pub async fn stashed_signs(&self, count: usize) -> Vec<SignPayloadsRequest> {
        loop {
            {
                let mut stashed = self.inner.stashed_sign.lock().unwrap();
                if stashed.len() >= count {
                    return stashed.drain(..).collect();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl MethodHandlers for TestWallet {
    fn authorize(&self, request: AuthorizeRequest) {
        let state = self.inner.clone();
        tokio::spawn(async move {
            let mode = state.mode.lock().unwrap().clone();
            match mode {
                WalletMode::Approve | WalletMode::InvalidPayloads(_) => {
                    let issued = state.issuer.issue(request.identity()).await.unwrap();
                    request.complete(issued.into());
                }
                WalletMode::Decline => {
                    request.complete_with_decline();
                }
                WalletMode::Ignore => {
                    state.stashed_authorize.lock().unwrap().push(request);
                }
            }
        });
    }

    fn sign_payloads(&self, request: SignPayloadsRequest) {
        let state = self.inner.clone();
        tokio::spawn(async move {
            let mode = state.mode.lock().unwrap().clone();
            match mode {
                WalletMode::Approve => match state.issuer.validate(request.auth_token()).await {
                    AuthTokenStatus::Valid => {
                        let mut signed = Vec::with_capacity(request.payloads().len());
                        for payload in request.payloads() {
                            signed.push(state.signer.sign(payload).await.unwrap());
                        }
                        request.complete(signed).unwrap();
                    }
                    AuthTokenStatus::ReauthorizationRequired => {
                        request.complete_with_reauthorization_required();
                    }
                    AuthTokenStatus::Invalid => {
                        request.complete_with_auth_token_not_valid();
                    }
                },
                WalletMode::Decline => {
                    request.complete_with_decline();
                }
                WalletMode::InvalidPayloads(valid) => {
                    request.complete_with_invalid_payloads(valid).unwrap();
                }
                WalletMode::Ignore => {
                    state.stashed_sign.lock().unwrap().push(request);
                }
            }
        });
    }

    fn sign_and_send_transactions(&self, request: SignAndSendTransactionsRequest) {
        let state = self.inner.clone();
        tokio::spawn(async move {
            let mode = state.mode.lock().unwrap().clone();
            match mode {
                WalletMode::Approve => match state.issuer.validate(request.auth_token()).await {
                    AuthTokenStatus::Valid => {
                        let mut signatures = Vec::with_capacity(request.transactions().len());
                        let mut committed = Vec::with_capacity(request.transactions().len());
                        for transaction in request.transactions() {
                            let signed = state.signer.sign(transaction).await.unwrap();
                            let submission = state
                                .submitter
                                .submit(&signed, request.commitment_level())
                                .await
                                .unwrap();
                            signatures.push(submission.signature);
                            committed.push(submission.committed);
                        }
                        if committed.iter().all(|c| *c) {
                            request.complete(signatures).unwrap();
                        } else {
                            request
                                .complete_with_not_committed(signatures, committed)
                                .unwrap();
                        }
                    }
                    AuthTokenStatus::ReauthorizationRequired => {
                        request.complete_with_reauthorization_required();
                    }
                    AuthTokenStatus::Invalid => {
                        request.complete_with_auth_token_not_valid();
                    }
                },
                WalletMode::Decline => {
                    request.complete_with_decline();
                }
                WalletMode::InvalidPayloads(valid) => {
                    request.complete_with_invalid_payloads(valid).unwrap();
                }
                WalletMode::Ignore => {
                    drop(request);
                }
            }
        });
    }
}

pub struct TestHarness {
    pub client: MwaClient,
    pub client_endpoint: RpcEndpoint,
    pub wallet_endpoint: RpcEndpoint,
    pub wallet: TestWallet,
}

/// Wire a client endpoint and a wallet endpoint together over in-memory
/// duplex streams, with both io tasks spawned.
pub fn pair(wallet: TestWallet) -> TestHarness {
    pair_with_config(wallet, ClientConfig::default())
}

pub fn pair_with_config(wallet: TestWallet, config: ClientConfig) -> TestHarness {
    let (client_writer, wallet_reader) = tokio::io::duplex(4096);
    let (wallet_writer, client_reader) = tokio::io::duplex(4096);

    let (client_endpoint, client_io) =
        RpcEndpoint::new((), client_writer.compat_write(), client_reader.compat());
    let (wallet_endpoint, wallet_io) = RpcEndpoint::new(
        MwaServer::new(wallet.clone()),
        wallet_writer.compat_write(),
        wallet_reader.compat(),
    );
    tokio::spawn(client_io);
    tokio::spawn(wallet_io);

    TestHarness {
        client: MwaClient::with_config(client_endpoint.clone(), config),
        client_endpoint,
        wallet_endpoint,
        wallet,
    }
}
