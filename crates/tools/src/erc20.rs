use anyhow::Result;
use mr_rpc_client::L1Ops;
use mr_types::{Address, U256};
use mr_utils::contract;

/// Handle to an ERC-20 token contract on L1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Erc20Contract {
    pub symbol: String,
    pub address: Address,
}

impl Erc20Contract {
    pub fn new(symbol: &str, address: Address) -> Self {
        Erc20Contract {
            symbol: symbol.to_string(),
            address,
        }
    }

    pub async fn balance_of(&self, l1: &dyn L1Ops, owner: Address) -> Result<U256> {
        let output = l1.call(self.address, contract::balance_of(owner)).await?;
        contract::decode_uint(&output)
    }
}
