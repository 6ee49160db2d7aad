pub mod account;
pub mod bytes;
pub mod fee;
pub mod receipt;
pub mod request;
pub mod serde_utils;
pub mod token;
pub mod tx;
pub mod units;

pub use ethereum_types::{Address, H256, U256, U64};
