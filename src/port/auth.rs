use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::domain::core::{AuthorizeResult, Identity};
use crate::domain::error::MwaError;

/// A freshly issued authorization, as produced by the wallet's token
/// issuer. Distinct from [`AuthorizeResult`] so the issuance seam is not
/// coupled to the wire result shape; convert with `From` when resolving
/// an authorize request.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedAuthorization {
    pub auth_token: String,
    pub public_key: String,
    pub wallet_uri_base: Option<Url>,
}

impl fmt::Debug for IssuedAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedAuthorization")
            .field("auth_token", &"<REDACTED>")
            .field("public_key", &self.public_key)
            .field("wallet_uri_base", &self.wallet_uri_base)
            .finish()
    }
}

impl From<IssuedAuthorization> for AuthorizeResult {
    fn from(issued: IssuedAuthorization) -> Self {
        AuthorizeResult {
            auth_token: issued.auth_token,
            public_key: issued.public_key,
            wallet_uri_base: issued.wallet_uri_base,
        }
    }
}

/// Validation outcome for a presented auth token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTokenStatus {
    Valid,
    ReauthorizationRequired,
    Invalid,
}

/// Issues and validates the opaque auth tokens carried by signing calls.
///
/// Token format, persistence, and expiry policy live entirely behind this
/// seam; the protocol core only moves the strings around.
#[async_trait]
pub trait AuthTokenIssuer: Send + Sync {
    /// Issue a fresh authorization for the given dapp identity.
    async fn issue(&self, identity: Option<&Identity>) -> Result<IssuedAuthorization, MwaError>;

    /// Check whether a presented token is still good for signing.
    async fn validate(&self, auth_token: &str) -> AuthTokenStatus;
}
