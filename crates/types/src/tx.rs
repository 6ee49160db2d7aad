use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use ethereum_types::{Address, U256};
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    account::{AccountId, Nonce, PubKeyHash},
    bytes::JsonBytes,
    token::{Token, TokenId},
    units::format_units,
};

pub const TRANSFER_OP: u8 = 5;
pub const WITHDRAW_OP: u8 = 3;
pub const CHANGE_PUB_KEY_OP: u8 = 7;
pub const WITHDRAW_NFT_OP: u8 = 10;

/// Hash of an L2 transaction, rendered as `sync-tx:<hex>`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub const PREFIX: &'static str = "sync-tx:";
}

impl From<[u8; 32]> for TxHash {
    fn from(hash: [u8; 32]) -> Self {
        TxHash(hash)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex_str = s
            .strip_prefix(Self::PREFIX)
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        let bytes = hex::decode(hex_str)?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow!("tx hash must be 32 bytes"))?;
        Ok(TxHash(hash))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// L2 signature: uncompressed public key plus recoverable signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSignature {
    pub pub_key: JsonBytes,
    pub signature: JsonBytes,
}

/// L1 signature over the human readable form of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "signature")]
pub enum TxEthSignature {
    EthereumSignature(JsonBytes),
}

fn push_u256(buf: &mut Vec<u8>, value: &U256) {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    buf.extend_from_slice(&word);
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub account_id: AccountId,
    pub from: Address,
    pub to: Address,
    pub token: TokenId,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub amount: U256,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub fee: U256,
    pub nonce: Nonce,
    pub signature: Option<TxSignature>,
}

impl Transfer {
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = vec![TRANSFER_OP];
        buf.extend_from_slice(&self.account_id.to_be_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.token.to_be_bytes());
        push_u256(&mut buf, &self.amount);
        push_u256(&mut buf, &self.fee);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    pub fn eth_message(&self, token: &Token) -> String {
        format!(
            "Transfer {amount} {symbol} to: {to:?}\nNonce: {nonce}\nFee: {fee} {symbol}\nAccount Id: {id}",
            amount = format_units(self.amount, token.decimals),
            symbol = token.symbol,
            to = self.to,
            nonce = self.nonce,
            fee = format_units(self.fee, token.decimals),
            id = self.account_id,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdraw {
    pub account_id: AccountId,
    pub from: Address,
    pub to: Address,
    pub token: TokenId,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub amount: U256,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub fee: U256,
    pub nonce: Nonce,
    pub signature: Option<TxSignature>,
}

impl Withdraw {
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = vec![WITHDRAW_OP];
        buf.extend_from_slice(&self.account_id.to_be_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.token.to_be_bytes());
        push_u256(&mut buf, &self.amount);
        push_u256(&mut buf, &self.fee);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    pub fn eth_message(&self, token: &Token) -> String {
        format!(
            "Withdraw {amount} {symbol} to: {to:?}\nNonce: {nonce}\nFee: {fee} {symbol}\nAccount Id: {id}",
            amount = format_units(self.amount, token.decimals),
            symbol = token.symbol,
            to = self.to,
            nonce = self.nonce,
            fee = format_units(self.fee, token.decimals),
            id = self.account_id,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawNft {
    pub account_id: AccountId,
    pub from: Address,
    pub to: Address,
    pub token: TokenId,
    pub fee_token: TokenId,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub fee: U256,
    pub nonce: Nonce,
    pub signature: Option<TxSignature>,
}

impl WithdrawNft {
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = vec![WITHDRAW_NFT_OP];
        buf.extend_from_slice(&self.account_id.to_be_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.token.to_be_bytes());
        buf.extend_from_slice(&self.fee_token.to_be_bytes());
        push_u256(&mut buf, &self.fee);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    pub fn eth_message(&self, fee_token: &Token) -> String {
        format!(
            "WithdrawNFT {token} to: {to:?}\nNonce: {nonce}\nFee: {fee} {symbol}\nAccount Id: {id}",
            token = self.token,
            to = self.to,
            nonce = self.nonce,
            fee = format_units(self.fee, fee_token.decimals),
            symbol = fee_token.symbol,
            id = self.account_id,
        )
    }
}

/// Authorization attached to a `ChangePubKey` transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangePubKeyEthAuthData {
    Onchain,
    #[serde(rename = "ECDSA")]
    Ecdsa {
        #[serde(rename = "ethSignature")]
        eth_signature: JsonBytes,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePubKey {
    pub account_id: AccountId,
    pub account: Address,
    pub new_pk_hash: PubKeyHash,
    pub fee_token: TokenId,
    #[serde(with = "crate::serde_utils::u256_dec")]
    pub fee: U256,
    pub nonce: Nonce,
    pub signature: Option<TxSignature>,
    pub eth_auth_data: ChangePubKeyEthAuthData,
}

impl ChangePubKey {
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = vec![CHANGE_PUB_KEY_OP];
        buf.extend_from_slice(&self.account_id.to_be_bytes());
        buf.extend_from_slice(self.account.as_bytes());
        buf.extend_from_slice(self.new_pk_hash.as_bytes());
        buf.extend_from_slice(&self.fee_token.to_be_bytes());
        push_u256(&mut buf, &self.fee);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    /// Message the L1 key signs to authorize the new key (ECDSA mode).
    pub fn eth_message(&self) -> String {
        format!(
            "Register rollup pubkey:\n\n{}\nnonce: 0x{:08x}\naccount id: 0x{:08x}\n\nOnly sign this message for a trusted client!",
            hex::encode(self.new_pk_hash.as_bytes()),
            self.nonce,
            self.account_id,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZkTx {
    Transfer(Box<Transfer>),
    Withdraw(Box<Withdraw>),
    #[serde(rename = "WithdrawNFT")]
    WithdrawNft(Box<WithdrawNft>),
    ChangePubKey(Box<ChangePubKey>),
}

impl ZkTx {
    pub fn account_id(&self) -> AccountId {
        match self {
            ZkTx::Transfer(tx) => tx.account_id,
            ZkTx::Withdraw(tx) => tx.account_id,
            ZkTx::WithdrawNft(tx) => tx.account_id,
            ZkTx::ChangePubKey(tx) => tx.account_id,
        }
    }

    pub fn nonce(&self) -> Nonce {
        match self {
            ZkTx::Transfer(tx) => tx.nonce,
            ZkTx::Withdraw(tx) => tx.nonce,
            ZkTx::WithdrawNft(tx) => tx.nonce,
            ZkTx::ChangePubKey(tx) => tx.nonce,
        }
    }

    pub fn signing_bytes(&self) -> Vec<u8> {
        match self {
            ZkTx::Transfer(tx) => tx.signing_bytes(),
            ZkTx::Withdraw(tx) => tx.signing_bytes(),
            ZkTx::WithdrawNft(tx) => tx.signing_bytes(),
            ZkTx::ChangePubKey(tx) => tx.signing_bytes(),
        }
    }

    pub fn signature(&self) -> Option<&TxSignature> {
        match self {
            ZkTx::Transfer(tx) => tx.signature.as_ref(),
            ZkTx::Withdraw(tx) => tx.signature.as_ref(),
            ZkTx::WithdrawNft(tx) => tx.signature.as_ref(),
            ZkTx::ChangePubKey(tx) => tx.signature.as_ref(),
        }
    }
}

/// Body of `POST transactions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTxRequest {
    pub tx: ZkTx,
    #[serde(default)]
    pub signature: Option<TxEthSignature>,
    #[serde(default)]
    pub fast_processing: Option<bool>,
}
