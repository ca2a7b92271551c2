use std::future::Future;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::hex;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::sol;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{AnchorChainClient, BlockHeader, ChainError};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IProtocolState {
        function EPOCH_SIZE(address dataMarket) external view returns (uint256);
        function SOURCE_CHAIN_BLOCK_TIME(address dataMarket) external view returns (uint256);
    }
}

type ProtocolStateInstance = IProtocolState::IProtocolStateInstance<Http<Client>, RootProvider<Http<Client>>>;

/// Anchor chain client over an HTTP alloy provider
pub struct EthAnchorClient {
    provider: RootProvider<Http<Client>>,
    protocol_state: ProtocolStateInstance,
    timeout: Duration,
}

impl EthAnchorClient {
    pub fn new(rpc_url: Url, protocol_state_contract: Address, timeout: Duration) -> Self {
        let provider = ProviderBuilder::new().on_http(rpc_url);
        let protocol_state = IProtocolState::new(protocol_state_contract, provider.clone());
        Self { provider, protocol_state, timeout }
    }

    async fn bounded<T>(
        &self,
        method: &'static str,
        request: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ChainError> {
        debug!(method, "Sending anchor chain RPC request");
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ChainError::Timeout { method, timeout: self.timeout })?
    }
}

#[async_trait]
impl AnchorChainClient for EthAnchorClient {
    async fn latest_block(&self) -> Result<BlockHeader, ChainError> {
        const METHOD: &str = "eth_getBlockByNumber";
        let block = self
            .bounded(METHOD, async {
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Latest, false.into())
                    .await
                    .map_err(|e| ChainError::from_transport(METHOD, e))
            })
            .await?
            .ok_or_else(|| ChainError::InvalidResponse { method: METHOD, message: "latest block not found".to_string() })?;
        Ok(BlockHeader { number: block.header.number, hash: hex::encode_prefixed(block.header.hash) })
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        const METHOD: &str = "eth_chainId";
        self.bounded(METHOD, async { self.provider.get_chain_id().await.map_err(|e| ChainError::from_transport(METHOD, e)) })
            .await
    }

    async fn epoch_size(&self, data_market: Address) -> Result<U256, ChainError> {
        self.bounded("eth_call", async {
            let size = self
                .protocol_state
                .EPOCH_SIZE(data_market)
                .call()
                .await
                .map_err(|e| ChainError::from_contract("EPOCH_SIZE", e))?;
            Ok(size._0)
        })
        .await
    }

    async fn source_chain_block_time(&self, data_market: Address) -> Result<U256, ChainError> {
        self.bounded("eth_call", async {
            let block_time = self
                .protocol_state
                .SOURCE_CHAIN_BLOCK_TIME(data_market)
                .call()
                .await
                .map_err(|e| ChainError::from_contract("SOURCE_CHAIN_BLOCK_TIME", e))?;
            Ok(block_time._0)
        })
        .await
    }
}
