//! Wire-level names shared by client and wallet.

pub const METHOD_AUTHORIZE: &str = "authorize";
pub const METHOD_SIGN_TRANSACTION: &str = "sign_transaction";
pub const METHOD_SIGN_MESSAGE: &str = "sign_message";
pub const METHOD_SIGN_AND_SEND_TRANSACTION: &str = "sign_and_send_transaction";

pub const PARAMETER_IDENTITY: &str = "identity";
pub const PARAMETER_PRIVILEGED_METHODS: &str = "privileged_methods";
pub const PARAMETER_AUTH_TOKEN: &str = "auth_token";
pub const PARAMETER_PAYLOADS: &str = "payloads";
pub const PARAMETER_COMMITMENT: &str = "commitment";

pub const RESULT_AUTH_TOKEN: &str = "auth_token";
pub const RESULT_PUBLIC_KEY: &str = "public_key";
pub const RESULT_WALLET_URI_BASE: &str = "wallet_uri_base";
pub const RESULT_SIGNED_PAYLOADS: &str = "signed_payloads";
pub const RESULT_SIGNATURES: &str = "signatures";

pub const DATA_INVALID_PAYLOAD_VALID: &str = "valid";
pub const DATA_NOT_COMMITTED_SIGNATURES: &str = "signatures";
pub const DATA_NOT_COMMITTED_COMMITMENT: &str = "commitment";
