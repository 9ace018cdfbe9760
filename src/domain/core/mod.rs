//! Core value types shared by both protocol endpoints.

mod identity;
mod method;
mod results;

pub use identity::Identity;
pub use method::{CommitmentLevel, PrivilegedMethod};
pub use results::{AuthorizeResult, SignAndSendTransactionsResult, SignPayloadsResult};
