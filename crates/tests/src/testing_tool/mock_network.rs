//! In-memory L1 node and rollup REST api.
//!
//! L1 transactions are executed against the rollup contract by decoding
//! their calldata. Submitted L2 transactions are verified the way the
//! operator would: signer signature, Ethereum signature, nonce and balance.

use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, bail, ensure, Result};
use async_trait::async_trait;
use ethabi::{decode, encode, short_signature, ParamType, Token as AbiToken};
use mr_rpc_client::{rest_client::ApiConfig, L1Ops, RollupApi};
use mr_types::{
    account::{AccountFullInfo, AccountId, AccountInfo, AccountRef, AccountType, BlockKind, Nft},
    bytes::JsonBytes,
    fee::{Fee, FeeRequest, TxFeeType},
    receipt::{EthLog, EthReceipt, PriorityOpReceipt, SerialId, TxReceipt, TxStatus},
    request::TransactionRequest,
    token::{Token, TokenId, TokenLike, TokenSet},
    tx::{
        ChangePubKey, ChangePubKeyEthAuthData, SubmitTxRequest, Transfer, TxEthSignature, TxHash,
        TxSignature, Withdraw, WithdrawNft, ZkTx,
    },
    Address, H256, U256, U64,
};
use mr_utils::{
    contract,
    hasher::{keccak256, EthHasher},
    signer::verify_signature,
    wallet::{recover_personal_signer, EthWallet},
};
use parking_lot::Mutex;

pub const GAS_USED: u64 = 21_000;
pub const GAS_PRICE: u64 = 1_000_000_000;
pub const MIN_NFT_TOKEN_ID: TokenId = 65536;

const DEPOSIT_OP: u8 = 1;
const FULL_EXIT_OP: u8 = 6;
const FULL_EXIT_NFT_OP: u8 = 11;
const PRIORITY_EXPIRATION_BLOCKS: u64 = 250;

pub fn contract_address() -> Address {
    Address::from_low_u64_be(0x1000)
}

pub fn default_tokens() -> Vec<Token> {
    let token = |id, address, symbol: &str, decimals| Token {
        id,
        address: Address::from_low_u64_be(address),
        symbol: symbol.to_string(),
        decimals,
        is_nft: false,
    };
    vec![
        token(0, 0, "ETH", 18),
        token(1, 0xda1, "DAI", 18),
        token(2, 0xb7c, "wBTC", 8),
    ]
}

pub fn gas_fee() -> U256 {
    U256::from(GAS_USED) * U256::from(GAS_PRICE)
}

/// Fixed fee in thousandths of a token.
fn fee_units(tx_type: TxFeeType) -> u64 {
    match tx_type {
        TxFeeType::Transfer => 1,
        TxFeeType::ChangePubKey(_) => 2,
        TxFeeType::Withdraw | TxFeeType::WithdrawNft => 3,
        TxFeeType::FastWithdraw | TxFeeType::FastWithdrawNft => 5,
    }
}

pub fn fee_for(tx_type: TxFeeType, token: &Token) -> U256 {
    U256::from(fee_units(tx_type)) * U256::exp10(token.decimals.saturating_sub(3) as usize)
}

fn selector(name: &str, params: &[ParamType]) -> [u8; 4] {
    short_signature(name, params)
}

fn decode_args(data: &[u8], params: &[ParamType]) -> Result<Vec<AbiToken>> {
    ensure!(data.len() >= 4, "calldata too short");
    Ok(decode(params, &data[4..])?)
}

fn arg_address(args: &[AbiToken], i: usize) -> Result<Address> {
    args.get(i)
        .cloned()
        .and_then(AbiToken::into_address)
        .ok_or_else(|| anyhow!("argument {} is not an address", i))
}

fn arg_uint(args: &[AbiToken], i: usize) -> Result<U256> {
    args.get(i)
        .cloned()
        .and_then(AbiToken::into_uint)
        .ok_or_else(|| anyhow!("argument {} is not an uint", i))
}

fn arg_bytes(args: &[AbiToken], i: usize) -> Result<Vec<u8>> {
    args.get(i)
        .cloned()
        .and_then(AbiToken::into_bytes)
        .ok_or_else(|| anyhow!("argument {} is not bytes", i))
}

#[derive(Default)]
struct State {
    block_number: u64,
    eth_balances: HashMap<Address, U256>,
    // (token, owner)
    erc20_balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address), U256>,
    l1_tx_count: u64,
    l1_receipts: HashMap<H256, EthReceipt>,
    accounts: BTreeMap<Address, AccountInfo>,
    next_account_id: AccountId,
    l2_tx_count: u64,
    receipts: HashMap<TxHash, TxReceipt>,
    priority_ops: Vec<PriorityOpReceipt>,
    // (owner, token)
    pending_balances: HashMap<(Address, Address), U256>,
    auth_facts: HashMap<(Address, u32), H256>,
    nfts: BTreeMap<TokenId, Nft>,
    next_nft_id: TokenId,
    fee_requests: usize,
    // receipts polled while this is non-zero are reported as queued
    queued_polls: u32,
    reject_next_priority_op: bool,
    foreign_priority_logs: bool,
}

impl State {
    fn eth_balance(&self, address: Address) -> U256 {
        self.eth_balances.get(&address).copied().unwrap_or_default()
    }

    fn erc20_balance(&self, token: Address, owner: Address) -> U256 {
        self.erc20_balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    /// Credit an L1 balance of ETH (zero token address) or an ERC-20.
    fn credit_l1(&mut self, token: Address, owner: Address, amount: U256) {
        let balance = if token.is_zero() {
            self.eth_balances.entry(owner).or_default()
        } else {
            self.erc20_balances.entry((token, owner)).or_default()
        };
        *balance += amount;
    }

    fn account_by_ref(&self, account: &AccountRef) -> Option<&AccountInfo> {
        match account {
            AccountRef::Address(address) => self.accounts.get(address),
            AccountRef::Id(id) => self.accounts.values().find(|a| a.account_id == *id),
        }
    }

    fn account_mut(&mut self, address: Address) -> &mut AccountInfo {
        let next_account_id = &mut self.next_account_id;
        self.accounts.entry(address).or_insert_with(|| {
            let info = AccountInfo::new(*next_account_id, address);
            *next_account_id += 1;
            info
        })
    }

    fn credit_l2(&mut self, address: Address, symbol: &str, amount: U256) {
        let block_number = self.block_number;
        let account = self.account_mut(address);
        *account.balances.entry(symbol.to_string()).or_default() += amount;
        account.last_update_in_block = block_number;
    }

    fn l2_balance(&self, address: Address, symbol: &str) -> U256 {
        self.accounts
            .get(&address)
            .map(|a| a.balance(symbol))
            .unwrap_or_default()
    }

    fn debit_l2(&mut self, address: Address, symbol: &str, amount: U256) -> Result<()> {
        let balance = self.l2_balance(address, symbol);
        ensure!(balance >= amount, "Not enough balance");
        self.account_mut(address)
            .balances
            .insert(symbol.to_string(), balance - amount);
        Ok(())
    }

    fn priority_log(
        &self,
        address: Address,
        sender: Address,
        serial_id: SerialId,
        op_type: u8,
    ) -> EthLog {
        EthLog {
            address,
            topics: vec![contract::new_priority_request_topic()],
            data: JsonBytes::from_vec(contract::encode_new_priority_request(
                sender,
                serial_id,
                op_type,
                Vec::new(),
                U256::from(self.block_number + PRIORITY_EXPIRATION_BLOCKS),
            )),
        }
    }

    /// Queue a priority op and return the logs of its request. The op is
    /// rejected when `reject_next_priority_op` was set.
    fn emit_priority_op(&mut self, rollup: Address, sender: Address, op_type: u8) -> Vec<EthLog> {
        let serial_id = self.priority_ops.len() as SerialId;
        let rejected = std::mem::take(&mut self.reject_next_priority_op);
        self.priority_ops.push(PriorityOpReceipt {
            serial_id,
            status: if rejected {
                TxStatus::Rejected
            } else {
                TxStatus::Finalized
            },
            block_number: Some(self.block_number),
        });
        let mut logs = Vec::new();
        if self.foreign_priority_logs {
            // same event from another contract, listed first
            logs.push(self.priority_log(
                Address::from_low_u64_be(0xdead),
                sender,
                SerialId::MAX,
                op_type,
            ));
        }
        logs.push(self.priority_log(rollup, sender, serial_id, op_type));
        logs
    }

    fn take_queued_poll(&mut self) -> bool {
        if self.queued_polls == 0 {
            return false;
        }
        self.queued_polls -= 1;
        true
    }

    /// Execute a call to the rollup contract, an `Err` reverts.
    fn execute_contract_call(
        &mut self,
        token_set: &TokenSet,
        rollup: Address,
        from: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Vec<EthLog>> {
        ensure!(data.len() >= 4, "calldata too short");
        let sel = &data[..4];
        let accepted = !self.reject_next_priority_op;

        if sel == selector("depositETH", &[ParamType::Address]) {
            let args = decode_args(data, &[ParamType::Address])?;
            let to = arg_address(&args, 0)?;
            if accepted {
                let eth = token_set.get(&TokenLike::Address(Address::zero()))?;
                self.credit_l2(to, &eth.symbol, value);
            } else {
                *self.pending_balances.entry((from, Address::zero())).or_default() += value;
            }
            return Ok(self.emit_priority_op(rollup, from, DEPOSIT_OP));
        }

        if sel
            == selector(
                "depositERC20",
                &[ParamType::Address, ParamType::Uint(104), ParamType::Address],
            )
        {
            let args = decode_args(
                data,
                &[ParamType::Address, ParamType::Uint(104), ParamType::Address],
            )?;
            let token = arg_address(&args, 0)?;
            let amount = arg_uint(&args, 1)?;
            let to = arg_address(&args, 2)?;
            let symbol = token_set.get(&TokenLike::Address(token))?.symbol.clone();
            let allowance = self
                .allowances
                .get(&(token, from))
                .copied()
                .unwrap_or_default();
            ensure!(allowance >= amount, "ERC20: insufficient allowance");
            let balance = self.erc20_balance(token, from);
            ensure!(balance >= amount, "ERC20: transfer amount exceeds balance");
            self.allowances.insert((token, from), allowance - amount);
            self.erc20_balances.insert((token, from), balance - amount);
            if accepted {
                self.credit_l2(to, &symbol, amount);
            } else {
                *self.pending_balances.entry((from, token)).or_default() += amount;
            }
            return Ok(self.emit_priority_op(rollup, from, DEPOSIT_OP));
        }

        if sel == selector("setAuthPubkeyHash", &[ParamType::Bytes, ParamType::Uint(32)]) {
            let args = decode_args(data, &[ParamType::Bytes, ParamType::Uint(32)])?;
            let pub_key_hash = arg_bytes(&args, 0)?;
            ensure!(pub_key_hash.len() == 20, "invalid pubkey hash length");
            let nonce = arg_uint(&args, 1)?.low_u32();
            self.auth_facts
                .insert((from, nonce), keccak256(&pub_key_hash));
            return Ok(Vec::new());
        }

        if sel == selector("requestFullExit", &[ParamType::Uint(32), ParamType::Address]) {
            let args = decode_args(data, &[ParamType::Uint(32), ParamType::Address])?;
            let account_id = arg_uint(&args, 0)?.low_u32();
            let token = arg_address(&args, 1)?;
            let symbol = token_set.get(&TokenLike::Address(token))?.symbol.clone();
            let owner = self
                .account_by_ref(&AccountRef::Id(account_id))
                .map(|a| a.address);
            // exits requested by someone else than the owner execute as no-ops
            if accepted && owner == Some(from) {
                let balance = self.l2_balance(from, &symbol);
                self.debit_l2(from, &symbol, balance)?;
                *self.pending_balances.entry((from, token)).or_default() += balance;
            }
            return Ok(self.emit_priority_op(rollup, from, FULL_EXIT_OP));
        }

        if sel == selector("requestFullExitNFT", &[ParamType::Uint(32), ParamType::Uint(32)]) {
            let args = decode_args(data, &[ParamType::Uint(32), ParamType::Uint(32)])?;
            let account_id = arg_uint(&args, 0)?.low_u32();
            let token_id = arg_uint(&args, 1)?.low_u32();
            let owner = self
                .account_by_ref(&AccountRef::Id(account_id))
                .map(|a| a.address);
            if accepted && owner == Some(from) {
                self.account_mut(from).nfts.remove(&token_id);
            }
            return Ok(self.emit_priority_op(rollup, from, FULL_EXIT_NFT_OP));
        }

        if sel
            == selector(
                "withdrawPendingBalance",
                &[ParamType::Address, ParamType::Address, ParamType::Uint(128)],
            )
        {
            let args = decode_args(
                data,
                &[ParamType::Address, ParamType::Address, ParamType::Uint(128)],
            )?;
            let owner = arg_address(&args, 0)?;
            let token = arg_address(&args, 1)?;
            let amount = arg_uint(&args, 2)?;
            let pending = self
                .pending_balances
                .get(&(owner, token))
                .copied()
                .unwrap_or_default();
            ensure!(pending >= amount, "insufficient pending balance");
            self.pending_balances.insert((owner, token), pending - amount);
            self.credit_l1(token, owner, amount);
            return Ok(Vec::new());
        }

        bail!("unknown rollup contract method 0x{}", hex::encode(sel))
    }

    fn execute_erc20_call(&mut self, token: Address, from: Address, data: &[u8]) -> Result<()> {
        let params = [ParamType::Address, ParamType::Uint(256)];
        ensure!(
            data.len() >= 4 && data[..4] == selector("approve", &params),
            "unknown ERC20 method"
        );
        let args = decode_args(data, &params)?;
        let amount = arg_uint(&args, 1)?;
        self.allowances.insert((token, from), amount);
        Ok(())
    }

    fn record_l2_tx(&mut self, signing_bytes: &[u8], result: Result<()>) -> TxHash {
        self.l2_tx_count += 1;
        let hash = EthHasher::new()
            .update(signing_bytes)
            .update(self.l2_tx_count.to_be_bytes())
            .finalize();
        let tx_hash = TxHash::from(hash.0);
        self.block_number += 1;
        let receipt = match result {
            Ok(()) => TxReceipt {
                tx_hash,
                status: TxStatus::Finalized,
                block_number: Some(self.block_number),
                fail_reason: None,
            },
            Err(err) => TxReceipt {
                tx_hash,
                status: TxStatus::Rejected,
                block_number: None,
                fail_reason: Some(err.to_string()),
            },
        };
        self.receipts.insert(tx_hash, receipt);
        tx_hash
    }

    /// Signature and nonce checks shared by the transactions of an unlocked
    /// account.
    fn check_signed(
        &self,
        from: Address,
        nonce: u32,
        signing_bytes: &[u8],
        signature: Option<&TxSignature>,
        eth_message: &str,
        eth_signature: Option<&[u8; 65]>,
    ) -> Result<()> {
        let account = self
            .accounts
            .get(&from)
            .ok_or_else(|| anyhow!("Account does not exist"))?;
        ensure!(!account.pub_key_hash.is_zero(), "Account is locked");
        let signature = signature.ok_or_else(|| anyhow!("Missing signature"))?;
        let signer = verify_signature(signing_bytes, signature)
            .map_err(|_| anyhow!("Incorrect signature"))?;
        ensure!(signer == account.pub_key_hash, "Incorrect signature");
        ensure!(nonce == account.nonce, "Nonce mismatch");
        let eth_signature = eth_signature.ok_or_else(|| anyhow!("Eth signature is missing"))?;
        let eth_signer = recover_personal_signer(eth_message.as_bytes(), eth_signature)
            .map_err(|_| anyhow!("Eth signature is incorrect"))?;
        ensure!(eth_signer == from, "Eth signature is incorrect");
        Ok(())
    }

    fn bump_nonce(&mut self, address: Address) {
        let block_number = self.block_number + 1;
        let account = self.account_mut(address);
        account.nonce += 1;
        account.last_update_in_block = block_number;
    }


    fn apply_transfer(
        &mut self,
        token: &Token,
        tx: &Transfer,
        eth_signature: Option<&[u8; 65]>,
    ) -> Result<()> {
        self.check_signed(
            tx.from,
            tx.nonce,
            &tx.signing_bytes(),
            tx.signature.as_ref(),
            &tx.eth_message(token),
            eth_signature,
        )?;
        self.debit_l2(tx.from, &token.symbol, tx.amount + tx.fee)?;
        self.credit_l2(tx.to, &token.symbol, tx.amount);
        self.bump_nonce(tx.from);
        Ok(())
    }

    fn apply_withdraw(
        &mut self,
        token: &Token,
        tx: &Withdraw,
        eth_signature: Option<&[u8; 65]>,
    ) -> Result<()> {
        self.check_signed(
            tx.from,
            tx.nonce,
            &tx.signing_bytes(),
            tx.signature.as_ref(),
            &tx.eth_message(token),
            eth_signature,
        )?;
        self.debit_l2(tx.from, &token.symbol, tx.amount + tx.fee)?;
        self.credit_l1(token.address, tx.to, tx.amount);
        self.bump_nonce(tx.from);
        Ok(())
    }

    fn apply_withdraw_nft(
        &mut self,
        fee_token: &Token,
        tx: &WithdrawNft,
        eth_signature: Option<&[u8; 65]>,
    ) -> Result<()> {
        self.check_signed(
            tx.from,
            tx.nonce,
            &tx.signing_bytes(),
            tx.signature.as_ref(),
            &tx.eth_message(fee_token),
            eth_signature,
        )?;
        ensure!(
            self.l2_balance(tx.from, &fee_token.symbol) >= tx.fee,
            "Not enough balance"
        );
        self.account_mut(tx.from)
            .nfts
            .remove(&tx.token)
            .ok_or_else(|| anyhow!("NFT {} is not owned by the account", tx.token))?;
        self.debit_l2(tx.from, &fee_token.symbol, tx.fee)?;
        self.bump_nonce(tx.from);
        Ok(())
    }

    /// The account may still be locked, the new key signs the tx itself.
    fn apply_change_pub_key(&mut self, fee_token: &Token, tx: &ChangePubKey) -> Result<()> {
        let nonce = self
            .accounts
            .get(&tx.account)
            .map(|a| a.nonce)
            .ok_or_else(|| anyhow!("Account does not exist"))?;
        ensure!(tx.nonce == nonce, "Nonce mismatch");
        let signature = tx
            .signature
            .as_ref()
            .ok_or_else(|| anyhow!("Missing signature"))?;
        let signer = verify_signature(&tx.signing_bytes(), signature)
            .map_err(|_| anyhow!("Incorrect signature"))?;
        ensure!(signer == tx.new_pk_hash, "Incorrect signature");
        match &tx.eth_auth_data {
            ChangePubKeyEthAuthData::Onchain => {
                let fact = self.auth_facts.get(&(tx.account, tx.nonce)).copied();
                ensure!(
                    fact == Some(keccak256(tx.new_pk_hash.as_bytes())),
                    "Onchain auth is not set"
                );
            }
            ChangePubKeyEthAuthData::Ecdsa { eth_signature } => {
                let eth_signer =
                    recover_personal_signer(tx.eth_message().as_bytes(), eth_signature.as_bytes())
                        .map_err(|_| anyhow!("Eth signature is incorrect"))?;
                ensure!(eth_signer == tx.account, "Eth signature is incorrect");
            }
        }
        self.debit_l2(tx.account, &fee_token.symbol, tx.fee)?;
        let account = self.account_mut(tx.account);
        account.pub_key_hash = tx.new_pk_hash;
        account.account_type = Some(AccountType::Owned);
        self.bump_nonce(tx.account);
        Ok(())
    }
}

pub struct MockNetwork {
    token_set: TokenSet,
    contract: Address,
    state: Mutex<State>,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNetwork {
    pub fn new() -> Self {
        MockNetwork {
            token_set: TokenSet::new(default_tokens()),
            contract: contract_address(),
            state: Mutex::new(State {
                next_nft_id: MIN_NFT_TOKEN_ID,
                ..Default::default()
            }),
        }
    }

    fn token(&self, token: &TokenLike) -> Result<Token> {
        self.token_set.get(token).cloned()
    }

    /// Give `owner` L1 funds of a token, `ETH` included.
    pub fn mint_l1(&self, owner: Address, symbol: &str, amount: U256) -> Result<()> {
        let token = self.token(&TokenLike::from(symbol))?;
        self.state.lock().credit_l1(token.address, owner, amount);
        Ok(())
    }

    pub fn l1_token_balance(&self, owner: Address, symbol: &str) -> Result<U256> {
        let token = self.token(&TokenLike::from(symbol))?;
        let state = self.state.lock();
        Ok(if token.is_eth() {
            state.eth_balance(owner)
        } else {
            state.erc20_balance(token.address, owner)
        })
    }

    pub fn pending_balance(&self, owner: Address, symbol: &str) -> Result<U256> {
        let token = self.token(&TokenLike::from(symbol))?;
        Ok(self
            .state
            .lock()
            .pending_balances
            .get(&(owner, token.address))
            .copied()
            .unwrap_or_default())
    }

    pub fn l2_balance(&self, owner: Address, symbol: &str) -> U256 {
        self.state.lock().l2_balance(owner, symbol)
    }

    /// Mint an NFT into an existing rollup account.
    pub fn mint_nft(&self, owner: Address, content_hash: H256) -> Result<TokenId> {
        let mut state = self.state.lock();
        let creator_id = state
            .accounts
            .get(&owner)
            .map(|a| a.account_id)
            .ok_or_else(|| anyhow!("account {:?} not found on the rollup", owner))?;
        let id = state.next_nft_id;
        state.next_nft_id += 1;
        let nft = Nft {
            id,
            content_hash,
            creator_id,
            creator_address: owner,
            serial_id: id - MIN_NFT_TOKEN_ID,
            address: Address::from_low_u64_be(id.into()),
            symbol: format!("NFT-{}", id),
        };
        let account = state.account_mut(owner);
        account.nfts.insert(id, nft.clone());
        account.minted_nfts.insert(id, nft.clone());
        state.nfts.insert(id, nft);
        Ok(id)
    }

    /// Reject the next priority op emitted by the rollup contract, its
    /// effect on the rollup is not applied.
    pub fn reject_next_priority_op(&self) {
        self.state.lock().reject_next_priority_op = true;
    }

    /// Prefix priority request logs with the same event from another
    /// contract.
    pub fn emit_foreign_priority_logs(&self, enabled: bool) {
        self.state.lock().foreign_priority_logs = enabled;
    }

    /// Report the next `polls` receipt lookups as queued.
    pub fn queue_next_polls(&self, polls: u32) {
        self.state.lock().queued_polls = polls;
    }

    /// Number of fee quotes served so far.
    pub fn fee_requests(&self) -> usize {
        self.state.lock().fee_requests
    }

    /// Last receipt recorded for a rollup tx, regardless of queued polls.
    pub fn tx_status(&self, tx_hash: &TxHash) -> Option<TxStatus> {
        self.state.lock().receipts.get(tx_hash).map(|r| r.status)
    }
}

#[async_trait]
impl L1Ops for MockNetwork {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.state.lock().eth_balance(address))
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let state = self.state.lock();
        if to == self.contract {
            let auth_facts = [ParamType::Address, ParamType::Uint(32)];
            let pending = [ParamType::Address, ParamType::Address];
            if data.len() >= 4 && data[..4] == selector("authFacts", &auth_facts) {
                let args = decode_args(&data, &auth_facts)?;
                let key = (arg_address(&args, 0)?, arg_uint(&args, 1)?.low_u32());
                let fact = state.auth_facts.get(&key).copied().unwrap_or_default();
                return Ok(encode(&[AbiToken::FixedBytes(fact.as_bytes().to_vec())]));
            }
            if data.len() >= 4 && data[..4] == selector("getPendingBalance", &pending) {
                let args = decode_args(&data, &pending)?;
                let key = (arg_address(&args, 0)?, arg_address(&args, 1)?);
                let balance = state
                    .pending_balances
                    .get(&key)
                    .copied()
                    .unwrap_or_default();
                return Ok(encode(&[AbiToken::Uint(balance)]));
            }
            bail!("unknown rollup contract view");
        }
        let owner = contract::decode_balance_of(&data)?;
        Ok(encode(&[AbiToken::Uint(state.erc20_balance(to, owner))]))
    }

    async fn send_transaction(&self, wallet: &EthWallet, tx: TransactionRequest) -> Result<H256> {
        let from = wallet.address();
        let mut state = self.state.lock();
        let balance = state.eth_balance(from);
        ensure!(
            balance >= tx.value + gas_fee(),
            "insufficient funds for gas * price + value"
        );
        state.eth_balances.insert(from, balance - gas_fee());

        let to = tx.to.ok_or_else(|| anyhow!("contract creation is not supported"))?;
        let is_token = self
            .token_set
            .tokens()
            .iter()
            .any(|t| !t.is_eth() && t.address == to);
        let result = if to == self.contract {
            state.execute_contract_call(&self.token_set, self.contract, from, tx.value, &tx.data)
        } else if is_token {
            state.execute_erc20_call(to, from, &tx.data).map(|_| Vec::new())
        } else {
            state.credit_l1(Address::zero(), to, tx.value);
            Ok(Vec::new())
        };
        let (status, logs) = match result {
            Ok(logs) => {
                let balance = state.eth_balance(from);
                state.eth_balances.insert(from, balance - tx.value);
                (U64::one(), logs)
            }
            Err(err) => {
                log::debug!("L1 tx from {:?} reverted: {}", from, err);
                (U64::zero(), Vec::new())
            }
        };

        state.l1_tx_count += 1;
        state.block_number += 1;
        let tx_hash = keccak256(state.l1_tx_count.to_be_bytes());
        let receipt = EthReceipt {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(state.block_number)),
            gas_used: Some(U256::from(GAS_USED)),
            effective_gas_price: Some(U256::from(GAS_PRICE)),
            status: Some(status),
            logs,
        };
        state.l1_receipts.insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn wait_for_transaction(&self, tx_hash: H256) -> Result<EthReceipt> {
        self.state
            .lock()
            .l1_receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| anyhow!("unknown L1 tx {:?}", tx_hash))
    }
}

#[async_trait]
impl RollupApi for MockNetwork {
    async fn config(&self) -> Result<ApiConfig> {
        Ok(ApiConfig {
            network: "localhost".to_string(),
            contract: self.contract,
            gov_contract: None,
            deposit_confirmations: 0,
        })
    }

    async fn tokens(&self) -> Result<Vec<Token>> {
        Ok(self.token_set.tokens().to_vec())
    }

    async fn account_info(
        &self,
        account: AccountRef,
        _kind: BlockKind,
    ) -> Result<Option<AccountInfo>> {
        // blocks are finalized as soon as they are committed
        Ok(self.state.lock().account_by_ref(&account).cloned())
    }

    async fn account_full_info(&self, account: AccountRef) -> Result<AccountFullInfo> {
        let info = self.state.lock().account_by_ref(&account).cloned();
        Ok(AccountFullInfo {
            committed: info.clone(),
            finalized: info,
        })
    }

    async fn fee(&self, req: &FeeRequest) -> Result<Fee> {
        let total_fee = fee_for(req.tx_type, &self.token(&req.token_like)?);
        self.state.lock().fee_requests += 1;
        Ok(Fee {
            gas_fee: total_fee,
            zkp_fee: U256::zero(),
            total_fee,
        })
    }

    async fn submit_tx(&self, req: &SubmitTxRequest) -> Result<TxHash> {
        let eth_signature = match &req.signature {
            Some(TxEthSignature::EthereumSignature(sig)) => Some(
                <[u8; 65]>::try_from(sig.as_bytes())
                    .map_err(|_| anyhow!("Eth signature has a wrong length"))?,
            ),
            None => None,
        };
        let eth_signature = eth_signature.as_ref();
        let mut state = self.state.lock();
        let result = match &req.tx {
            ZkTx::Transfer(tx) => self
                .token(&TokenLike::Id(tx.token))
                .and_then(|token| state.apply_transfer(&token, tx, eth_signature)),
            ZkTx::Withdraw(tx) => self
                .token(&TokenLike::Id(tx.token))
                .and_then(|token| state.apply_withdraw(&token, tx, eth_signature)),
            ZkTx::WithdrawNft(tx) => self
                .token(&TokenLike::Id(tx.fee_token))
                .and_then(|token| state.apply_withdraw_nft(&token, tx, eth_signature)),
            ZkTx::ChangePubKey(tx) => self
                .token(&TokenLike::Id(tx.fee_token))
                .and_then(|token| state.apply_change_pub_key(&token, tx)),
        };
        Ok(state.record_l2_tx(&req.tx.signing_bytes(), result))
    }

    async fn tx_receipt(&self, tx_hash: &TxHash) -> Result<Option<TxReceipt>> {
        let mut state = self.state.lock();
        let mut receipt = match state.receipts.get(tx_hash).cloned() {
            Some(receipt) => receipt,
            None => return Ok(None),
        };
        if state.take_queued_poll() {
            receipt.status = TxStatus::Queued;
            receipt.block_number = None;
        }
        Ok(Some(receipt))
    }

    async fn priority_op_receipt(
        &self,
        serial_id: SerialId,
    ) -> Result<Option<PriorityOpReceipt>> {
        let mut state = self.state.lock();
        let index = usize::try_from(serial_id)?;
        let mut receipt = match state.priority_ops.get(index).cloned() {
            Some(receipt) => receipt,
            None => return Ok(None),
        };
        if state.take_queued_poll() {
            receipt.status = TxStatus::Queued;
            receipt.block_number = None;
        }
        Ok(Some(receipt))
    }

    async fn nft(&self, id: TokenId) -> Result<Option<Nft>> {
        Ok(self.state.lock().nfts.get(&id).cloned())
    }
}
