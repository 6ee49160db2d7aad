use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::{anyhow, Result};
use ethereum_types::{Address, U256};
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::token::TokenId;

pub type AccountId = u32;
pub type Nonce = u32;

/// Hash of an L2 signing public key, rendered as `sync:<hex>`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct PubKeyHash(pub [u8; 20]);

impl PubKeyHash {
    pub const PREFIX: &'static str = "sync:";

    pub fn zero() -> Self {
        PubKeyHash([0u8; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PubKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl FromStr for PubKeyHash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex_str = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| anyhow!("pub key hash must start with {}", Self::PREFIX))?;
        let bytes = hex::decode(hex_str)?;
        let hash: [u8; 20] = bytes
            .try_into()
            .map_err(|_| anyhow!("pub key hash must be 20 bytes"))?;
        Ok(PubKeyHash(hash))
    }
}

impl Serialize for PubKeyHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PubKeyHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// An account is addressed either by id or by its L1 address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountRef {
    Id(AccountId),
    Address(Address),
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Id(id) => write!(f, "{}", id),
            AccountRef::Address(address) => write!(f, "{:?}", address),
        }
    }
}

impl From<Address> for AccountRef {
    fn from(address: Address) -> Self {
        AccountRef::Address(address)
    }
}

impl From<AccountId> for AccountRef {
    fn from(id: AccountId) -> Self {
        AccountRef::Id(id)
    }
}

impl FromStr for AccountRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(id) = s.parse::<AccountId>() {
            return Ok(AccountRef::Id(id));
        }
        let hex_str = s.strip_prefix("0x").unwrap_or(s);
        let address = Address::from_str(hex_str)
            .map_err(|err| anyhow!("invalid account reference {}: {}", s, err))?;
        Ok(AccountRef::Address(address))
    }
}

/// Which state an account query is answered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Included in a committed block, may still be reverted.
    Committed,
    /// Proven on L1.
    Finalized,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Committed => "committed",
            BlockKind::Finalized => "finalized",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Owned,
    #[serde(rename = "CREATE2")]
    Create2,
    No2FA,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub id: TokenId,
    pub content_hash: ethereum_types::H256,
    pub creator_id: AccountId,
    pub creator_address: Address,
    pub serial_id: u32,
    pub address: Address,
    pub symbol: String,
}

/// Account state as seen at one block kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_id: AccountId,
    pub address: Address,
    pub nonce: Nonce,
    pub pub_key_hash: PubKeyHash,
    pub last_update_in_block: u64,
    /// Balances by token symbol.
    #[serde(with = "crate::serde_utils::u256_dec_map")]
    pub balances: BTreeMap<String, U256>,
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub nfts: BTreeMap<TokenId, Nft>,
    #[serde(default)]
    pub minted_nfts: BTreeMap<TokenId, Nft>,
}

impl AccountInfo {
    pub fn new(account_id: AccountId, address: Address) -> Self {
        AccountInfo {
            account_id,
            address,
            nonce: 0,
            pub_key_hash: PubKeyHash::zero(),
            last_update_in_block: 0,
            balances: BTreeMap::new(),
            account_type: None,
            nfts: BTreeMap::new(),
            minted_nfts: BTreeMap::new(),
        }
    }

    /// Balance of a token symbol, zero when the account never held it.
    pub fn balance(&self, symbol: &str) -> U256 {
        self.balances
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, v)| *v)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFullInfo {
    pub committed: Option<AccountInfo>,
    pub finalized: Option<AccountInfo>,
}
