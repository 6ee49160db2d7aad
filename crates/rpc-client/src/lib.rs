pub mod error;
pub mod eth_client;
pub mod rest_client;
pub mod rollup_client;
pub mod traits;
mod utils;

pub use eth_client::EthRpcClient;
pub use rest_client::RestClient;
pub use rollup_client::RollupClient;
pub use traits::{L1Ops, L2Ops, RollupApi};
