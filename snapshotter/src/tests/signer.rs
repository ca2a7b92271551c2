use std::sync::Arc;

use alloy::sol_types::Eip712Domain;
use assert_matches::assert_matches;
use rstest::rstest;

use crate::core::client::chain::{ChainError, MockAnchorChainClient};
use crate::tests::common::constants::*;
use crate::tests::common::{domain, fixed_block_chain, signature_service};
use crate::worker::signer::{parse_signing_key, recover_signer, SigningError};

#[rstest]
#[case(None, SLOT_ID)]
#[case(Some(3), 3)]
#[tokio::test]
async fn test_generate_builds_request_from_latest_block(#[case] slot_override: Option<u64>, #[case] expected_slot: u64) {
    let service = signature_service(Arc::new(fixed_block_chain()));

    let signed = service.generate("bafkreicid", 42, PROJECT_ID, slot_override, None).await.unwrap();

    assert_eq!(signed.request.deadline, ANCHOR_BLOCK_NUMBER + DEADLINE_BUFFER);
    assert!(signed.request.deadline > ANCHOR_BLOCK_NUMBER);
    assert_eq!(signed.request.slot_id, expected_slot);
    assert_eq!(signed.request.epoch_id, 42);
    assert_eq!(signed.request.project_id, PROJECT_ID);
    assert_eq!(signed.request.snapshot_cid, "bafkreicid");
    assert_eq!(signed.header, ANCHOR_BLOCK_HASH);
}

#[rstest]
#[tokio::test]
async fn test_signature_recovers_to_identity_address(domain: Eip712Domain) {
    let service = signature_service(Arc::new(fixed_block_chain()));

    let signed = service.generate("bafkreicid", 42, PROJECT_ID, None, None).await.unwrap();

    assert!(signed.signature.v() == 27 || signed.signature.v() == 28);
    assert_eq!(service.identity_address(), IDENTITY_ADDRESS);
    assert_eq!(recover_signer(&signed.request, &domain, &signed.signature).unwrap(), IDENTITY_ADDRESS);
}

#[rstest]
#[tokio::test]
async fn test_signing_key_override_signs_with_delegate(domain: Eip712Domain) {
    let service = signature_service(Arc::new(fixed_block_chain()));

    let signed = service.generate("bafkreicid", 42, PROJECT_ID, None, Some(DELEGATE_PRIVATE_KEY)).await.unwrap();

    let signer = recover_signer(&signed.request, &domain, &signed.signature).unwrap();
    assert_eq!(signer, DELEGATE_ADDRESS);
    assert_ne!(signer, IDENTITY_ADDRESS);
}

#[rstest]
#[tokio::test]
async fn test_signature_does_not_verify_under_another_domain() {
    let service = signature_service(Arc::new(fixed_block_chain()));
    let signed = service.generate("bafkreicid", 42, PROJECT_ID, None, None).await.unwrap();

    let other_chain = crate::worker::metadata::signing_domain(ANCHOR_CHAIN_ID + 1, PROTOCOL_CONTRACT);
    let recovered = recover_signer(&signed.request, &other_chain, &signed.signature).unwrap();
    assert_ne!(recovered, IDENTITY_ADDRESS);
}

#[rstest]
#[tokio::test]
async fn test_signing_is_deterministic() {
    let service = signature_service(Arc::new(fixed_block_chain()));

    let first = service.generate("bafkreicid", 42, PROJECT_ID, None, None).await.unwrap();
    let second = service.generate("bafkreicid", 42, PROJECT_ID, None, None).await.unwrap();

    assert_eq!(first.request, second.request);
    assert_eq!(first.signature, second.signature);
}

#[rstest]
#[case(IDENTITY_PRIVATE_KEY)]
#[case(&IDENTITY_PRIVATE_KEY[2..])]
#[case("  0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80\n")]
fn test_signing_key_accepts_prefixed_and_bare_hex(#[case] key: &str) {
    assert_eq!(parse_signing_key(key).unwrap().address(), IDENTITY_ADDRESS);
}

#[rstest]
#[case("")]
#[case("0x1234")]
#[case("not-a-key")]
fn test_invalid_signing_key_is_rejected(#[case] key: &str) {
    assert_matches!(parse_signing_key(key), Err(SigningError::InvalidKey(_)));
}

#[rstest]
#[tokio::test]
async fn test_invalid_override_key_fails_the_request() {
    let service = signature_service(Arc::new(fixed_block_chain()));

    let result = service.generate("bafkreicid", 42, PROJECT_ID, None, Some("0xzz")).await;

    assert_matches!(result, Err(SigningError::InvalidKey(_)));
}

#[rstest]
#[tokio::test]
async fn test_block_fetch_failure_propagates_without_retry() {
    let mut chain = MockAnchorChainClient::new();
    chain.expect_latest_block().times(1).returning(|| {
        Err(ChainError::Rpc { method: "eth_getBlockByNumber", code: -32000, message: "header not found".into() })
    });
    let service = signature_service(Arc::new(chain));

    let result = service.generate("bafkreicid", 42, PROJECT_ID, None, None).await;

    assert_matches!(result, Err(SigningError::AnchorBlock(ChainError::Rpc { code: -32000, .. })));
}
