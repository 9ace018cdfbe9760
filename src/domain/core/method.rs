use serde::{Deserialize, Serialize};

/// A signing capability a dapp may request at authorize time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegedMethod {
    SignTransaction,
    SignMessage,
    SignAndSendTransaction,
}

impl PrivilegedMethod {
    /// The wire name of the method this privilege grants.
    pub fn method_name(&self) -> &'static str {
        match self {
            PrivilegedMethod::SignTransaction => "sign_transaction",
            PrivilegedMethod::SignMessage => "sign_message",
            PrivilegedMethod::SignAndSendTransaction => "sign_and_send_transaction",
        }
    }

    /// Look up a privilege by its wire method name.
    pub fn from_method_name(name: &str) -> Option<Self> {
        match name {
            "sign_transaction" => Some(PrivilegedMethod::SignTransaction),
            "sign_message" => Some(PrivilegedMethod::SignMessage),
            "sign_and_send_transaction" => Some(PrivilegedMethod::SignAndSendTransaction),
            _ => None,
        }
    }
}

/// Blockchain finality target for `sign_and_send_transaction`.
///
/// Ordered by strength: `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    Processed,
    Confirmed,
    Finalized,
}

impl CommitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        }
    }

    pub fn from_commitment_level(s: &str) -> Option<Self> {
        match s {
            "processed" => Some(CommitmentLevel::Processed),
            "confirmed" => Some(CommitmentLevel::Confirmed),
            "finalized" => Some(CommitmentLevel::Finalized),
            _ => None,
        }
    }
}
