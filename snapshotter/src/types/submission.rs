use alloy::hex;
use alloy::primitives::{B256, U256};
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};

use crate::core::client::collector::proto;

sol! {
    /// Typed message signed for every submission. The struct name is part of the type
    /// hash and must not change.
    struct EIPRequest {
        uint256 slotId;
        uint256 deadline;
        string snapshotCid;
        uint256 epochId;
        string projectId;
    }
}

/// The claim a snapshotter makes about one epoch of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub slot_id: u64,
    /// Anchor chain block number after which the claim is no longer valid
    pub deadline: u64,
    pub snapshot_cid: String,
    pub epoch_id: u64,
    pub project_id: String,
}

impl SubmissionRequest {
    pub fn to_typed_data(&self) -> EIPRequest {
        EIPRequest {
            slotId: U256::from(self.slot_id),
            deadline: U256::from(self.deadline),
            snapshotCid: self.snapshot_cid.clone(),
            epochId: U256::from(self.epoch_id),
            projectId: self.project_id.clone(),
        }
    }

    /// EIP-712 digest of this request under `domain`
    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.to_typed_data().eip712_signing_hash(domain)
    }
}

impl From<SubmissionRequest> for proto::Request {
    fn from(request: SubmissionRequest) -> Self {
        proto::Request {
            slot_id: request.slot_id,
            deadline: request.deadline,
            snapshot_cid: request.snapshot_cid,
            epoch_id: request.epoch_id,
            project_id: request.project_id,
        }
    }
}

/// 65 byte recoverable signature laid out as `r || s || v`, with `v` in {27, 28}
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSignature([u8; 65]);

impl SnapshotSignature {
    pub fn from_rsv(mut bytes: [u8; 65]) -> Self {
        if bytes[64] < 27 {
            bytes[64] += 27;
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Lowercase hex without `0x` prefix, the form the collector expects
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for SnapshotSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SnapshotSignature(0x{})", self.to_hex())
    }
}

/// A signed request, ready to be written to the collector stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedSubmission {
    pub request: SubmissionRequest,
    pub signature: SnapshotSignature,
    /// Hash of the anchor block whose number the deadline was derived from
    pub header: String,
}

impl SignedSubmission {
    pub fn into_message(self) -> proto::SnapshotSubmission {
        proto::SnapshotSubmission {
            signature: self.signature.to_hex(),
            header: self.header,
            request: Some(self.request.into()),
        }
    }
}
