use std::borrow::Cow;
use std::sync::OnceLock;

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::Eip712Domain;
use tracing::{info, warn};

use crate::core::client::chain::{AnchorChainClient, ChainError};
use crate::types::params::ProtocolParams;

pub const SIGNING_DOMAIN_NAME: &str = "PowerloomProtocolContract";
pub const SIGNING_DOMAIN_VERSION: &str = "0.1";

/// `SOURCE_CHAIN_BLOCK_TIME` is stored on chain multiplied by this factor
const BLOCK_TIME_SCALE: f64 = 10_000.0;

/// Protocol constants resolved once at startup
#[derive(Debug, Clone)]
pub struct ProtocolMetadata {
    pub chain_id: u64,
    pub protocol_contract: Address,
    pub data_market: Address,
    pub domain: Eip712Domain,
    pub domain_separator: B256,
    /// Source chain blocks per epoch, unset when the contract call failed
    pub epoch_size: Option<u64>,
    /// Seconds per source chain block, unset when the contract call failed
    pub source_chain_block_time: Option<f64>,
}

pub fn signing_domain(chain_id: u64, protocol_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(SIGNING_DOMAIN_NAME)),
        Some(Cow::Borrowed(SIGNING_DOMAIN_VERSION)),
        Some(U256::from(chain_id)),
        Some(protocol_contract),
        None,
    )
}

/// Write-once holder of [`ProtocolMetadata`]
#[derive(Debug, Default)]
pub struct ProtocolMetadataCache {
    metadata: OnceLock<ProtocolMetadata>,
}

impl ProtocolMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&ProtocolMetadata> {
        self.metadata.get()
    }

    /// Resolves the metadata on first call; later calls return the cached value without
    /// touching the chain.
    ///
    /// Only a failure to resolve the chain id is an error: without it no signature would ever
    /// verify. The two contract reads degrade to `None` independently.
    pub async fn initialize(
        &self,
        chain: &dyn AnchorChainClient,
        params: &ProtocolParams,
    ) -> Result<&ProtocolMetadata, ChainError> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }

        let chain_id = match params.anchor_chain_id {
            Some(chain_id) => chain_id,
            None => chain.chain_id().await?,
        };
        let domain = signing_domain(chain_id, params.protocol_state_contract);
        let domain_separator = domain.separator();

        let epoch_size = match fetch_epoch_size(chain, params).await {
            Ok(size) => Some(size),
            Err(err) => {
                warn!(error = %err, "Could not read EPOCH_SIZE, continuing without it");
                None
            }
        };
        let source_chain_block_time = match fetch_block_time(chain, params).await {
            Ok(seconds) => Some(seconds),
            Err(err) => {
                warn!(error = %err, "Could not read SOURCE_CHAIN_BLOCK_TIME, continuing without it");
                None
            }
        };

        let metadata = ProtocolMetadata {
            chain_id,
            protocol_contract: params.protocol_state_contract,
            data_market: params.data_market,
            domain,
            domain_separator,
            epoch_size,
            source_chain_block_time,
        };
        info!(
            chain_id,
            protocol_contract = %metadata.protocol_contract,
            domain_separator = %metadata.domain_separator,
            epoch_size = ?metadata.epoch_size,
            source_chain_block_time = ?metadata.source_chain_block_time,
            "Protocol metadata resolved"
        );

        // First writer wins
        Ok(self.metadata.get_or_init(|| metadata))
    }
}

async fn fetch_epoch_size(chain: &dyn AnchorChainClient, params: &ProtocolParams) -> Result<u64, ChainError> {
    let value = chain.epoch_size(params.data_market).await?;
    u64::try_from(value).map_err(|e| ChainError::Decode { function: "EPOCH_SIZE", message: e.to_string() })
}

async fn fetch_block_time(chain: &dyn AnchorChainClient, params: &ProtocolParams) -> Result<f64, ChainError> {
    let scaled = u128::try_from(chain.source_chain_block_time(params.data_market).await?)
        .map_err(|e| ChainError::Decode { function: "SOURCE_CHAIN_BLOCK_TIME", message: e.to_string() })?;
    Ok(scaled as f64 / BLOCK_TIME_SCALE)
}
