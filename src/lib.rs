//! Mobile Wallet Adapter protocol core.
//!
//! A request/response protocol by which a dapp asks a wallet to authorize
//! it, sign opaque payloads, and optionally submit signed transactions.
//! This crate implements the pieces both endpoints share:
//!
//! - a strict JSON-RPC 2.0 codec and a full-duplex [`rpc::RpcEndpoint`]
//!   with correlated calls, per-call timeout, and cancellation
//! - the wallet-side dispatcher [`services::MwaServer`], which turns each
//!   inbound method into a typed request the wallet UI resolves with a
//!   verdict
//! - the dapp-side [`services::MwaClient`], which returns typed results
//!   and a flat error enumeration
//! - the [`association::AssociationUri`] parser that bootstraps a local
//!   or remote scenario from a handoff URI
//!
//! Transports, transaction construction, token issuance, and keystores
//! stay behind the seams in [`port`].

pub mod association;
pub mod domain;
pub mod port;
pub mod rpc;
pub mod services;

pub use association::{
    AssociationUri, LocalAssociationUri, RemoteAssociationUri, ScenarioCallbacks, ScenarioFactory,
};
pub use domain::{
    AuthorizeResult, CommitmentLevel, Identity, MwaError, PrivilegedMethod,
    SignAndSendTransactionsResult, SignPayloadsResult,
};
pub use port::{
    AuthTokenIssuer, AuthTokenStatus, IssuedAuthorization, MethodHandlers, PayloadSigner,
    SignerError, Submission, TransactionSubmitter,
};
pub use rpc::{
    CallError, MethodCall, ReplySink, RpcDispatcher, RpcEndpoint, DEFAULT_PROTOCOL_TIMEOUT,
};
pub use services::{
    AuthorizeRequest, ClientConfig, MwaClient, MwaClientError, MwaServer,
    SignAndSendTransactionsRequest, SignPayloadsRequest, SignType, VerdictError,
    WalletAdapterClient,
};
