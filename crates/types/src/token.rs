use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::units::{format_units, parse_units};

pub type TokenId = u32;

/// Symbol of the native L1 currency.
pub const ETH_SYMBOL: &str = "ETH";

/// Any accepted way of naming a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenLike {
    Id(TokenId),
    Address(Address),
    Symbol(String),
}

impl From<TokenId> for TokenLike {
    fn from(id: TokenId) -> Self {
        TokenLike::Id(id)
    }
}

impl From<Address> for TokenLike {
    fn from(address: Address) -> Self {
        TokenLike::Address(address)
    }
}

impl From<&str> for TokenLike {
    fn from(symbol: &str) -> Self {
        TokenLike::Symbol(symbol.to_string())
    }
}

impl FromStr for TokenLike {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<TokenId>() {
            return Ok(TokenLike::Id(id));
        }
        if let Some(hex_str) = s.strip_prefix("0x") {
            if let Ok(address) = Address::from_str(hex_str) {
                return Ok(TokenLike::Address(address));
            }
        }
        Ok(TokenLike::Symbol(s.to_string()))
    }
}

impl fmt::Display for TokenLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLike::Id(id) => write!(f, "#{}", id),
            TokenLike::Address(address) => write!(f, "{:?}", address),
            TokenLike::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub is_nft: bool,
}

impl Token {
    pub fn is_eth(&self) -> bool {
        self.address.is_zero()
    }
}

/// Tokens known to the rollup, as returned by its `tokens` endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    tokens: Vec<Token>,
}

impl TokenSet {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenSet { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Resolve a token; symbols match case-insensitively.
    pub fn resolve(&self, token: &TokenLike) -> Option<&Token> {
        self.tokens.iter().find(|t| match token {
            TokenLike::Id(id) => t.id == *id,
            TokenLike::Address(address) => t.address == *address,
            TokenLike::Symbol(symbol) => t.symbol.eq_ignore_ascii_case(symbol),
        })
    }

    pub fn get(&self, token: &TokenLike) -> Result<&Token> {
        self.resolve(token)
            .ok_or_else(|| anyhow!("token {} is not supported by the rollup", token))
    }

    pub fn is_eth(&self, token: &TokenLike) -> bool {
        match token {
            TokenLike::Symbol(symbol) if symbol.eq_ignore_ascii_case(ETH_SYMBOL) => true,
            _ => self.resolve(token).map(Token::is_eth).unwrap_or(false),
        }
    }

    /// Parse a human readable amount using the token's decimals.
    pub fn parse_token(&self, token: &TokenLike, amount: &str) -> Result<U256> {
        let token = self.get(token)?;
        parse_units(amount, token.decimals)
    }

    pub fn format_token(&self, token: &TokenLike, amount: U256) -> Result<String> {
        let token = self.get(token)?;
        Ok(format_units(amount, token.decimals))
    }
}
