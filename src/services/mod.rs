//! Protocol endpoints: the wallet-side dispatcher and the dapp-side client.

pub mod client;
pub mod server;

pub use client::{ClientConfig, MwaClient, MwaClientError, WalletAdapterClient};
pub use server::{
    AuthorizeRequest, MwaServer, SignAndSendTransactionsRequest, SignPayloadsRequest, SignType,
    VerdictError,
};
