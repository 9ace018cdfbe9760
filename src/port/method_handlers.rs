use crate::services::server::{
    AuthorizeRequest, SignAndSendTransactionsRequest, SignPayloadsRequest,
};

/// The wallet capabilities the method dispatcher depends on.
///
/// Each hook receives a typed request by value and should hand it to
/// whatever resolves it (UI prompt, policy engine, signer). Requests may
/// be resolved from any thread, at any later time; a dropped request is
/// never answered, so implementations must not lose them.
pub trait MethodHandlers: Send + Sync + 'static {
    fn authorize(&self, request: AuthorizeRequest);

    fn sign_payloads(&self, request: SignPayloadsRequest);

    fn sign_and_send_transactions(&self, request: SignAndSendTransactionsRequest);
}
