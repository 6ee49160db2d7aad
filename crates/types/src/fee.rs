use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::token::TokenLike;

/// How a new signing key is authorized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangePubKeyAuthType {
    /// The key hash was registered on the rollup contract beforehand.
    Onchain,
    /// The change is authorized by an L1 signature.
    #[serde(rename = "ECDSA")]
    Ecdsa,
    #[serde(rename = "CREATE2")]
    Create2,
}

/// Operation kinds the rollup quotes fees for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxFeeType {
    Transfer,
    Withdraw,
    FastWithdraw,
    #[serde(rename = "WithdrawNFT")]
    WithdrawNft,
    #[serde(rename = "FastWithdrawNFT")]
    FastWithdrawNft,
    ChangePubKey(ChangePubKeyAuthType),
}

impl TxFeeType {
    pub fn withdraw(fast: bool) -> Self {
        if fast {
            TxFeeType::FastWithdraw
        } else {
            TxFeeType::Withdraw
        }
    }

    pub fn withdraw_nft(fast: bool) -> Self {
        if fast {
            TxFeeType::FastWithdrawNft
        } else {
            TxFeeType::WithdrawNft
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    pub tx_type: TxFeeType,
    pub address: Address,
    pub token_like: TokenLike,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub gas_fee: U256,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub zkp_fee: U256,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub total_fee: U256,
}
