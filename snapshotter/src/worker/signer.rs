use std::str::FromStr as _;
use std::sync::Arc;

use alloy::primitives::{Address, PrimitiveSignature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy::sol_types::Eip712Domain;
use thiserror::Error;
use tracing::debug;

use crate::core::client::chain::{AnchorChainClient, ChainError};
use crate::types::submission::{SignedSubmission, SnapshotSignature, SubmissionRequest};

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Could not fetch the anchor block: {0}")]
    AnchorBlock(#[from] ChainError),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Failed to sign submission: {0}")]
    Signing(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Deadline overflows block {block} + {buffer}")]
    DeadlineOverflow { block: u64, buffer: u64 },
}

/// Parses a hex private key, with or without `0x` prefix
pub fn parse_signing_key(key: &str) -> Result<PrivateKeySigner, SigningError> {
    let key = key.trim();
    let hex = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")).unwrap_or(key);
    PrivateKeySigner::from_str(hex).map_err(|e| SigningError::InvalidKey(e.to_string()))
}

/// Address whose key produced `signature` over `request` under `domain`
pub fn recover_signer(
    request: &SubmissionRequest,
    domain: &Eip712Domain,
    signature: &SnapshotSignature,
) -> Result<Address, SigningError> {
    let hash = request.signing_hash(domain);
    let signature = PrimitiveSignature::try_from(&signature.as_bytes()[..])
        .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;
    signature.recover_address_from_prehash(&hash).map_err(|e| SigningError::InvalidSignature(e.to_string()))
}

/// Builds and signs submission requests against the current anchor block.
pub struct SignatureService {
    anchor_chain: Arc<dyn AnchorChainClient>,
    identity: PrivateKeySigner,
    domain: Eip712Domain,
    deadline_buffer: u64,
    default_slot_id: u64,
}

impl SignatureService {
    pub fn new(
        anchor_chain: Arc<dyn AnchorChainClient>,
        identity: PrivateKeySigner,
        domain: Eip712Domain,
        deadline_buffer: u64,
        default_slot_id: u64,
    ) -> Self {
        Self { anchor_chain, identity, domain, deadline_buffer, default_slot_id }
    }

    pub fn identity_address(&self) -> Address {
        self.identity.address()
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Signs a claim that `snapshot_cid` is the snapshot of `project_id` for `epoch_id`.
    ///
    /// The deadline is the latest anchor block plus the configured buffer, and the block hash is
    /// returned as the message header. Chain errors are not retried. `signing_key` replaces the
    /// identity key for this one request.
    pub async fn generate(
        &self,
        snapshot_cid: &str,
        epoch_id: u64,
        project_id: &str,
        slot_id: Option<u64>,
        signing_key: Option<&str>,
    ) -> Result<SignedSubmission, SigningError> {
        let block = self.anchor_chain.latest_block().await?;
        let deadline = block
            .number
            .checked_add(self.deadline_buffer)
            .ok_or(SigningError::DeadlineOverflow { block: block.number, buffer: self.deadline_buffer })?;

        let request = SubmissionRequest {
            slot_id: slot_id.unwrap_or(self.default_slot_id),
            deadline,
            snapshot_cid: snapshot_cid.to_string(),
            epoch_id,
            project_id: project_id.to_string(),
        };

        let signature = match signing_key {
            Some(key) => self.sign(&parse_signing_key(key)?, &request)?,
            None => self.sign(&self.identity, &request)?,
        };
        debug!(anchor_block = block.number, deadline, slot_id = request.slot_id, "Signed submission request");

        Ok(SignedSubmission { request, signature, header: block.hash })
    }

    /// Signs the EIP-712 hash of `request` with `signer`
    pub fn sign(&self, signer: &PrivateKeySigner, request: &SubmissionRequest) -> Result<SnapshotSignature, SigningError> {
        let hash = request.signing_hash(&self.domain);
        let signature = signer.sign_hash_sync(&hash).map_err(|e| SigningError::Signing(e.to_string()))?;
        Ok(SnapshotSignature::from_rsv(signature.as_bytes()))
    }
}
