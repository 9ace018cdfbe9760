//! End-to-end method scenarios over an in-memory duplex pair.

mod common;

use std::time::Duration;

use serde_json::json;

use common::{invert, pair, pair_with_config, PatternSubmitter, TestWallet, WalletMode, AUTH_TOKEN, PUBLIC_KEY, STALE_AUTH_TOKEN};
use mwa_rs::{
    CallError, ClientConfig, CommitmentLevel, Identity, MwaClientError, PrivilegedMethod,
    DEFAULT_PROTOCOL_TIMEOUT,
};

#[tokio::test]
async fn authorize_happy_path() {
    let harness = pair(TestWallet::new(WalletMode::Approve));
    let identity = Identity::builder().name("Example Dapp".to_string()).build();
    let result = harness
        .client
        .authorize(Some(identity), &[PrivilegedMethod::SignTransaction])
        .await
        .unwrap();
    assert_eq!(result.auth_token, AUTH_TOKEN);
    assert_eq!(result.public_key, PUBLIC_KEY);
    assert_eq!(result.wallet_uri_base, None);
}

#[tokio::test]
async fn authorize_declined() {
    let harness = pair(TestWallet::new(WalletMode::Decline));
    let err = harness
        .client
        .authorize(None, &[PrivilegedMethod::SignMessage])
        .await
        .unwrap_err();
    assert_eq!(err, MwaClientError::AuthorizationFailed);
}

#[tokio::test]
async fn sign_transactions_round_trip() {
    let harness = pair(TestWallet::new(WalletMode::Approve));
    let transactions = vec![vec![0xDE, 0xAD], vec![0x01, 0x02, 0x03]];
    let result = harness
        .client
        .sign_transactions(AUTH_TOKEN, &transactions)
        .await
        .unwrap();
    assert_eq!(
        result.signed_payloads,
        transactions.iter().map(|t| invert(t)).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn sign_messages_declined() {
    let harness = pair(TestWallet::new(WalletMode::Decline));
    let err = harness
        .client
        .sign_messages(AUTH_TOKEN, &[vec![0x01]])
        .await
        .unwrap_err();
    assert_eq!(err, MwaClientError::Declined);
}

#[tokio::test]
async fn stale_auth_token_requires_reauthorization() {
    let harness = pair(TestWallet::new(WalletMode::Approve));
    let err = harness
        .client
        .sign_transactions(STALE_AUTH_TOKEN, &[vec![0x01]])
        .await
        .unwrap_err();
    assert_eq!(err, MwaClientError::ReauthorizationRequired);
}

#[tokio::test]
async fn unknown_auth_token_fails_authorization() {
    let harness = pair(TestWallet::new(WalletMode::Approve));
    let err = harness
        .client
        .sign_and_send_transactions("bogus", &[vec![0x01]], CommitmentLevel::Confirmed)
        .await
        .unwrap_err();
    assert_eq!(err, MwaClientError::AuthorizationFailed);
}

#[tokio::test]
async fn partially_invalid_payloads_surface_the_validity_vector() {
    let harness = pair(TestWallet::new(WalletMode::InvalidPayloads(vec![true, false])));
    let err = harness
        .client
        .sign_transactions(AUTH_TOKEN, &[vec![0x01], vec![0x02]])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MwaClientError::InvalidPayloads {
            valid: vec![true, false]
        }
    );
}

#[tokio::test]
async fn sign_and_send_transactions_happy_path() {
    let harness = pair(TestWallet::new(WalletMode::Approve));
    let transactions = vec![vec![0xDE, 0xAD]];
    let result = harness
        .client
        .sign_and_send_transactions(AUTH_TOKEN, &transactions, CommitmentLevel::Finalized)
        .await
        .unwrap();
    assert_eq!(result.signatures, vec![invert(&transactions[0])]);
}

#[tokio::test]
async fn uncommitted_transactions_surface_signatures_and_commitment() {
    let wallet = TestWallet::with_submitter(
        WalletMode::Approve,
        PatternSubmitter::new(vec![true, false]),
    );
    let harness = pair(wallet);
    let transactions = vec![vec![0x01], vec![0x02]];
    let err = harness
        .client
        .sign_and_send_transactions(AUTH_TOKEN, &transactions, CommitmentLevel::Confirmed)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MwaClientError::NotCommitted {
            signatures: vec![invert(&transactions[0]), invert(&transactions[1])],
            commitment: vec![true, false],
        }
    );
}

#[tokio::test]
async fn client_refuses_invalid_inputs_without_sending() {
    let harness = pair(TestWallet::new(WalletMode::Approve));

    let err = harness.client.authorize(None, &[]).await.unwrap_err();
    assert!(matches!(err, MwaClientError::InvalidInput(_)));

    let err = harness
        .client
        .sign_transactions("", &[vec![0x01]])
        .await
        .unwrap_err();
    assert!(matches!(err, MwaClientError::InvalidInput(_)));

    let err = harness
        .client
        .sign_messages(AUTH_TOKEN, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, MwaClientError::InvalidInput(_)));

    let err = harness
        .client
        .sign_messages(AUTH_TOKEN, &[vec![]])
        .await
        .unwrap_err();
    assert!(matches!(err, MwaClientError::InvalidInput(_)));
}

#[tokio::test]
async fn server_rejects_invalid_parameters_on_the_wire() {
    let harness = pair(TestWallet::new(WalletMode::Approve));

    // Bypass client-side validation to exercise the server's checks.
    let err = harness
        .client_endpoint
        .call(
            "sign_transaction",
            Some(json!({"auth_token": "tok", "payloads": []})),
            DEFAULT_PROTOCOL_TIMEOUT,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Remote { code: -32602, .. }));

    let err = harness
        .client_endpoint
        .call(
            "sign_message",
            Some(json!({"payloads": ["3q0"]})),
            DEFAULT_PROTOCOL_TIMEOUT,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Remote { code: -32602, .. }));

    let err = harness
        .client_endpoint
        .call("mint_coins", Some(json!({})), DEFAULT_PROTOCOL_TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Remote { code: -32601, .. }));
}

#[tokio::test]
async fn timeout_resolves_once_and_late_reply_is_dropped() {
    let harness = pair_with_config(
        TestWallet::new(WalletMode::Ignore),
        ClientConfig {
            request_timeout: Duration::from_millis(100),
        },
    );

    let err = harness
        .client
        .sign_messages(AUTH_TOKEN, &[vec![0x01]])
        .await
        .unwrap_err();
    assert_eq!(err, MwaClientError::Timeout);

    // The wallet resolves the stashed request after the client gave up;
    // the late reply must be discarded without disturbing the session.
    let stashed = harness.wallet.stashed_signs(1).await;
    let signed = stashed[0].payloads().to_vec();
    stashed[0].complete(signed).unwrap();

    harness.wallet.set_mode(WalletMode::Approve);
    let result = harness
        .client
        .sign_messages(AUTH_TOKEN, &[vec![0x0F]])
        .await
        .unwrap();
    assert_eq!(result.signed_payloads, vec![invert(&[0x0F])]);
}

#[tokio::test]
async fn replies_may_arrive_out_of_request_order() {
    let harness = pair(TestWallet::new(WalletMode::Ignore));
    let client = std::sync::Arc::new(harness.client);

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.sign_messages(AUTH_TOKEN, &[vec![0x01]]).await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.sign_messages(AUTH_TOKEN, &[vec![0x02]]).await }
    });

    let mut stashed = harness.wallet.stashed_signs(2).await;
    // Answer in reverse arrival order; correlation is by id, not order.
    stashed.sort_by_key(|request| std::cmp::Reverse(request.payloads()[0].clone()));
    for request in &stashed {
        let signed = request.payloads().iter().map(|p| invert(p)).collect();
        request.complete(signed).unwrap();
    }

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.signed_payloads, vec![invert(&[0x01])]);
    assert_eq!(second.signed_payloads, vec![invert(&[0x02])]);
}

#[tokio::test]
async fn inbound_requests_are_served_while_outbound_calls_pend() {
    let harness = pair(TestWallet::new(WalletMode::Ignore));
    let client = std::sync::Arc::new(harness.client);

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.sign_messages(AUTH_TOKEN, &[vec![0x2A]]).await }
    });
    let stashed = harness.wallet.stashed_signs(1).await;

    // The client endpoint runs no dispatcher, so a wallet-initiated call
    // gets method-not-found while the client's own call is still open.
    let err = harness
        .wallet_endpoint
        .call("ping", None, DEFAULT_PROTOCOL_TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Remote { code: -32601, .. }));

    let signed = stashed[0].payloads().iter().map(|p| invert(p)).collect();
    stashed[0].complete(signed).unwrap();
    let result = pending.await.unwrap().unwrap();
    assert_eq!(result.signed_payloads, vec![invert(&[0x2A])]);
}

#[tokio::test]
async fn transport_close_cancels_pending_calls() {
    let harness = pair(TestWallet::new(WalletMode::Ignore));
    let client = std::sync::Arc::new(harness.client);

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.sign_messages(AUTH_TOKEN, &[vec![0x01]]).await }
    });
    let stashed = harness.wallet.stashed_signs(1).await;

    harness.wallet_endpoint.close();
    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err, MwaClientError::Cancelled);

    // Resolving after teardown is a quiet no-op.
    let signed = stashed[0].payloads().to_vec();
    assert_eq!(stashed[0].complete(signed), Ok(false));
}
