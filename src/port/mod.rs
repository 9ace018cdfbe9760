//! Seams between the protocol core and its injected collaborators.

mod auth;
mod method_handlers;
mod signer;

pub use auth::{AuthTokenIssuer, AuthTokenStatus, IssuedAuthorization};
pub use method_handlers::MethodHandlers;
pub use signer::{PayloadSigner, SignerError, Submission, TransactionSubmitter};
