pub mod contract;
pub mod eth_tx;
pub mod hasher;
pub mod signer;
pub mod sync_wallet;
pub mod wallet;
