pub mod channel;
pub mod common;
pub mod signer;
