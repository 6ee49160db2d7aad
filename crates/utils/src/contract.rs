//! Calldata for the rollup contract and ERC-20 tokens.

use anyhow::{anyhow, Context as _, Result};
use ethabi::{decode, encode, long_signature, short_signature, ParamType, Token};
use mr_types::{account::AccountId, token::TokenId, Address, H256, U256};

fn call_data(name: &str, params: &[ParamType], tokens: &[Token]) -> Vec<u8> {
    let mut data = short_signature(name, params).to_vec();
    data.extend(encode(tokens));
    data
}

pub fn balance_of(owner: Address) -> Vec<u8> {
    call_data("balanceOf", &[ParamType::Address], &[Token::Address(owner)])
}

pub fn approve(spender: Address, amount: U256) -> Vec<u8> {
    call_data(
        "approve",
        &[ParamType::Address, ParamType::Uint(256)],
        &[Token::Address(spender), Token::Uint(amount)],
    )
}

pub fn deposit_eth(to: Address) -> Vec<u8> {
    call_data("depositETH", &[ParamType::Address], &[Token::Address(to)])
}

pub fn deposit_erc20(token: Address, amount: U256, to: Address) -> Vec<u8> {
    call_data(
        "depositERC20",
        &[ParamType::Address, ParamType::Uint(104), ParamType::Address],
        &[Token::Address(token), Token::Uint(amount), Token::Address(to)],
    )
}

pub fn set_auth_pubkey_hash(pub_key_hash: &[u8], nonce: u32) -> Vec<u8> {
    call_data(
        "setAuthPubkeyHash",
        &[ParamType::Bytes, ParamType::Uint(32)],
        &[
            Token::Bytes(pub_key_hash.to_vec()),
            Token::Uint(nonce.into()),
        ],
    )
}

pub fn auth_facts(owner: Address, nonce: u32) -> Vec<u8> {
    call_data(
        "authFacts",
        &[ParamType::Address, ParamType::Uint(32)],
        &[Token::Address(owner), Token::Uint(nonce.into())],
    )
}

pub fn request_full_exit(account_id: AccountId, token: Address) -> Vec<u8> {
    call_data(
        "requestFullExit",
        &[ParamType::Uint(32), ParamType::Address],
        &[Token::Uint(account_id.into()), Token::Address(token)],
    )
}

pub fn request_full_exit_nft(account_id: AccountId, token_id: TokenId) -> Vec<u8> {
    call_data(
        "requestFullExitNFT",
        &[ParamType::Uint(32), ParamType::Uint(32)],
        &[Token::Uint(account_id.into()), Token::Uint(token_id.into())],
    )
}

pub fn get_pending_balance(owner: Address, token: Address) -> Vec<u8> {
    call_data(
        "getPendingBalance",
        &[ParamType::Address, ParamType::Address],
        &[Token::Address(owner), Token::Address(token)],
    )
}

pub fn withdraw_pending_balance(owner: Address, token: Address, amount: U256) -> Vec<u8> {
    call_data(
        "withdrawPendingBalance",
        &[ParamType::Address, ParamType::Address, ParamType::Uint(128)],
        &[
            Token::Address(owner),
            Token::Address(token),
            Token::Uint(amount),
        ],
    )
}

fn new_priority_request_params() -> [ParamType; 5] {
    [
        ParamType::Address,
        ParamType::Uint(64),
        ParamType::Uint(8),
        ParamType::Bytes,
        ParamType::Uint(256),
    ]
}

/// Topic of `NewPriorityRequest(address,uint64,uint8,bytes,uint256)`.
pub fn new_priority_request_topic() -> H256 {
    long_signature("NewPriorityRequest", &new_priority_request_params())
}

pub fn encode_new_priority_request(
    sender: Address,
    serial_id: u64,
    op_type: u8,
    pub_data: Vec<u8>,
    expiration_block: U256,
) -> Vec<u8> {
    encode(&[
        Token::Address(sender),
        Token::Uint(serial_id.into()),
        Token::Uint(op_type.into()),
        Token::Bytes(pub_data),
        Token::Uint(expiration_block),
    ])
}

/// Serial id carried by a `NewPriorityRequest` log.
pub fn decode_new_priority_request(data: &[u8]) -> Result<u64> {
    let tokens = decode(&new_priority_request_params(), data).context("decode priority request")?;
    let serial_id = tokens
        .get(1)
        .cloned()
        .and_then(Token::into_uint)
        .ok_or_else(|| anyhow!("missing serial id"))?;
    Ok(serial_id.low_u64())
}

pub fn decode_uint(data: &[u8]) -> Result<U256> {
    let mut tokens = decode(&[ParamType::Uint(256)], data).context("decode uint")?;
    tokens
        .pop()
        .and_then(Token::into_uint)
        .ok_or_else(|| anyhow!("expect an uint"))
}

pub fn decode_bytes32(data: &[u8]) -> Result<H256> {
    let mut tokens = decode(&[ParamType::FixedBytes(32)], data).context("decode bytes32")?;
    let bytes = tokens
        .pop()
        .and_then(Token::into_fixed_bytes)
        .ok_or_else(|| anyhow!("expect bytes32"))?;
    Ok(H256::from_slice(&bytes))
}

/// Owner argument of an encoded `balanceOf` call.
pub fn decode_balance_of(data: &[u8]) -> Result<Address> {
    let selector = short_signature("balanceOf", &[ParamType::Address]);
    if data.len() < 4 || data[..4] != selector {
        return Err(anyhow!("not a balanceOf call"));
    }
    let mut tokens = decode(&[ParamType::Address], &data[4..]).context("decode balanceOf")?;
    tokens
        .pop()
        .and_then(Token::into_address)
        .ok_or_else(|| anyhow!("expect an address"))
}
