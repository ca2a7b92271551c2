use alloy::primitives::{address, Address};

/// Well known development key #0
pub const IDENTITY_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const IDENTITY_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Well known development key #1, bare hex
pub const DELEGATE_PRIVATE_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const DELEGATE_ADDRESS: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub const PROTOCOL_CONTRACT: Address = address!("E88E5f64AEB483d7057645326AdDFA24A3B312DF");
pub const DATA_MARKET: Address = address!("0C2E22fe7526fAeF28E7A58c84f8723dEFcE200c");

pub const ANCHOR_CHAIN_ID: u64 = 11165;
pub const ANCHOR_BLOCK_NUMBER: u64 = 1_000_000;
pub const ANCHOR_BLOCK_HASH: &str = "0x5f1e7b4a8c2d9e0f3a6b1c4d7e0f2a5b8c1d4e7f0a3b6c9d2e5f8a1b4c7d0e3f";

pub const DEADLINE_BUFFER: u64 = 120;
pub const SLOT_ID: u64 = 7;
pub const INSTANCE_ID: &str = "snapshotter-test-instance";
pub const PROJECT_ID: &str = "pairContract_trade_volume:0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc:UNISWAPV2";
