use async_trait::async_trait;
use thiserror::Error;

use crate::domain::core::CommitmentLevel;

#[derive(Debug, Clone, Error)]
pub enum SignerError {
    #[error("payload rejected by signer")]
    InvalidPayload,

    #[error("signing failed: {0}")]
    Internal(String),
}

/// Produces a signature over an opaque payload. Keystore access and the
/// signature scheme are the implementor's business.
#[async_trait]
pub trait PayloadSigner: Send + Sync {
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Outcome of submitting one signed transaction to the network.
#[derive(Debug, Clone)]
pub struct Submission {
    pub signature: Vec<u8>,
    pub committed: bool,
}

/// Submits signed transactions and reports whether each reached the
/// requested commitment level.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(
        &self,
        signed_transaction: &[u8],
        commitment: CommitmentLevel,
    ) -> Result<Submission, SignerError>;
}
