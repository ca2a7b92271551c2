use std::str::FromStr as _;
use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use crate::cli::protocol::ProtocolCliArgs;
use crate::SnapshotterError;

#[derive(Debug, Clone)]
pub struct ProtocolParams {
    pub anchor_rpc_url: Url,
    /// Overrides `eth_chainId` when set
    pub anchor_chain_id: Option<u64>,
    pub rpc_timeout: Duration,
    pub protocol_state_contract: Address,
    pub data_market: Address,
    /// Always at least one block
    pub deadline_buffer: u64,
}

impl TryFrom<&ProtocolCliArgs> for ProtocolParams {
    type Error = SnapshotterError;

    fn try_from(args: &ProtocolCliArgs) -> Result<Self, Self::Error> {
        let anchor_rpc_url = args
            .anchor_rpc_url
            .clone()
            .ok_or_else(|| SnapshotterError::ConfigError("Anchor chain RPC URL is required".to_string()))?;
        let protocol_state_contract = parse_address("protocol state contract", args.protocol_state_contract.as_deref())?;
        let data_market = parse_address("data market contract", args.data_market_contract.as_deref())?;
        if args.deadline_buffer == 0 {
            return Err(SnapshotterError::ConfigError("Deadline buffer must be at least one block".to_string()));
        }

        Ok(Self {
            anchor_rpc_url,
            anchor_chain_id: args.anchor_chain_id,
            rpc_timeout: Duration::from_secs(args.anchor_rpc_timeout_secs),
            protocol_state_contract,
            data_market,
            deadline_buffer: args.deadline_buffer,
        })
    }
}

fn parse_address(name: &str, value: Option<&str>) -> Result<Address, SnapshotterError> {
    let value = value.ok_or_else(|| SnapshotterError::ConfigError(format!("Address of the {} is required", name)))?;
    Address::from_str(value.trim())
        .map_err(|e| SnapshotterError::ConfigError(format!("Invalid address of the {}: {}", name, e)))
}
