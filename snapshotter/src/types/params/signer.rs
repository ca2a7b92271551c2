use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::cli::signer::SignerCliArgs;
use crate::worker::signer::parse_signing_key;
use crate::SnapshotterError;

#[derive(Debug, Clone)]
pub struct SignerParams {
    pub identity: PrivateKeySigner,
    pub slot_id: u64,
    pub instance_id: String,
}

impl SignerParams {
    pub fn address(&self) -> Address {
        self.identity.address()
    }
}

impl TryFrom<&SignerCliArgs> for SignerParams {
    type Error = SnapshotterError;

    fn try_from(args: &SignerCliArgs) -> Result<Self, Self::Error> {
        let key = args
            .signer_private_key
            .as_deref()
            .ok_or_else(|| SnapshotterError::ConfigError("Signer private key is required".to_string()))?;
        let identity = parse_signing_key(key)?;
        let slot_id = args.slot_id.ok_or_else(|| SnapshotterError::ConfigError("Slot id is required".to_string()))?;
        let instance_id = args
            .instance_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SnapshotterError::ConfigError("Instance id is required".to_string()))?;

        Ok(Self { identity, slot_id, instance_id })
    }
}
