use std::fmt;

use url::Url;

/// Successful `authorize` outcome.
///
/// `auth_token` and `public_key` are opaque strings produced by the
/// wallet's token issuer. `wallet_uri_base` is an optional absolute URI
/// the dapp should prefer for future associations.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizeResult {
    pub auth_token: String,
    pub public_key: String,
    pub wallet_uri_base: Option<Url>,
}

impl fmt::Debug for AuthorizeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeResult")
            .field("auth_token", &"<REDACTED>")
            .field("public_key", &self.public_key)
            .field("wallet_uri_base", &self.wallet_uri_base)
            .finish()
    }
}

/// Successful `sign_transaction` / `sign_message` outcome. The signed
/// payload count always equals the request payload count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignPayloadsResult {
    pub signed_payloads: Vec<Vec<u8>>,
}

/// Successful `sign_and_send_transaction` outcome. The signature count
/// always equals the request transaction count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignAndSendTransactionsResult {
    pub signatures: Vec<Vec<u8>>,
}
