pub mod error;
pub mod eth;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

pub use error::ChainError;
pub use eth::EthAnchorClient;

/// Number and hash of an anchor chain block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: String,
}

/// Read-only access to the anchor chain and the protocol state contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnchorChainClient: Send + Sync {
    /// Latest block known to the node
    async fn latest_block(&self) -> Result<BlockHeader, ChainError>;

    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// `EPOCH_SIZE(dataMarket)` on the protocol state contract
    async fn epoch_size(&self, data_market: Address) -> Result<U256, ChainError>;

    /// `SOURCE_CHAIN_BLOCK_TIME(dataMarket)`, scaled by 10^4 on chain
    async fn source_chain_block_time(&self, data_market: Address) -> Result<U256, ChainError>;
}
