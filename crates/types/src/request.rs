//! Operation parameters handed to the client layer. Fees left as `None` are
//! quoted from the rollup before signing.

use ethereum_types::{Address, U256};

use crate::{
    fee::ChangePubKeyAuthType,
    token::{TokenId, TokenLike},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub token: TokenLike,
    pub amount: U256,
    pub fee: Option<U256>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub eth_address: Address,
    pub token: TokenLike,
    pub amount: U256,
    pub fee: Option<U256>,
    pub fast_processing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawNftRequest {
    pub to: Address,
    pub token: TokenId,
    pub fee_token: TokenLike,
    pub fee: Option<U256>,
    pub fast_processing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangePubKeyRequest {
    pub fee_token: TokenLike,
    pub fee: Option<U256>,
    pub eth_auth_type: ChangePubKeyAuthType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositRequest {
    pub deposit_to: Address,
    pub token: TokenLike,
    pub amount: U256,
    /// Approve exactly `amount` before depositing an ERC-20 token.
    pub approve_deposit_amount_for_erc20: bool,
}

/// An L1 transaction before gas and nonce are filled in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
    pub nonce: Option<U256>,
}

impl TransactionRequest {
    pub fn transfer(to: Address, value: U256) -> Self {
        TransactionRequest {
            to: Some(to),
            value,
            ..Default::default()
        }
    }

    pub fn call(to: Address, data: Vec<u8>) -> Self {
        TransactionRequest {
            to: Some(to),
            data,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}
