use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, ensure, Result};
use async_trait::async_trait;
use mr_types::{
    account::{AccountFullInfo, AccountId, AccountInfo, AccountRef, BlockKind, Nft},
    bytes::JsonBytes,
    fee::{ChangePubKeyAuthType, Fee, FeeRequest, TxFeeType},
    receipt::{PriorityOpHandle, PriorityOpReceipt, TxReceipt, TxStatus},
    request::{
        ChangePubKeyRequest, DepositRequest, TransactionRequest, TransferRequest,
        WithdrawNftRequest, WithdrawRequest,
    },
    token::{Token, TokenId, TokenLike, TokenSet},
    tx::{
        ChangePubKey, ChangePubKeyEthAuthData, SubmitTxRequest, Transfer, TxEthSignature, TxHash,
        Withdraw, WithdrawNft, ZkTx,
    },
    Address, H256, U256,
};
use mr_utils::{contract, hasher::keccak256, sync_wallet::SyncWallet, wallet::EthWallet};

use crate::{
    traits::{L1Ops, L2Ops, RollupApi},
    utils::poll_until,
};

/// Rollup access over the REST api, with L1 side operations sent to the
/// rollup contract through an [`L1Ops`].
pub struct RollupClient {
    api: Arc<dyn RollupApi>,
    l1: Arc<dyn L1Ops>,
    token_set: TokenSet,
    contract: Address,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl RollupClient {
    pub fn new(
        api: Arc<dyn RollupApi>,
        l1: Arc<dyn L1Ops>,
        contract: Address,
        tokens: Vec<Token>,
    ) -> Self {
        RollupClient {
            api,
            l1,
            token_set: TokenSet::new(tokens),
            contract,
            poll_interval: Duration::from_millis(50),
            receipt_timeout: Duration::from_secs(300),
        }
    }

    /// Fetch the network config and token list.
    pub async fn connect(api: Arc<dyn RollupApi>, l1: Arc<dyn L1Ops>) -> Result<Self> {
        let config = api.config().await?;
        let tokens = api.tokens().await?;
        log::info!(
            "connected to rollup {}, contract: {:?}, tokens: {}",
            config.network,
            config.contract,
            tokens.len()
        );
        Ok(Self::new(api, l1, config.contract, tokens))
    }

    pub fn with_polling(mut self, poll_interval: Duration, receipt_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.receipt_timeout = receipt_timeout;
        self
    }

    async fn committed_account(&self, address: Address) -> Result<AccountInfo> {
        self.api
            .account_info(address.into(), BlockKind::Committed)
            .await?
            .ok_or_else(|| anyhow!("account {:?} not found on the rollup", address))
    }

    async fn resolve_fee(
        &self,
        fee: Option<U256>,
        tx_type: TxFeeType,
        address: Address,
        token: &TokenLike,
    ) -> Result<U256> {
        match fee {
            Some(fee) => Ok(fee),
            None => Ok(self
                .transaction_fee(tx_type, address, token)
                .await?
                .total_fee),
        }
    }

    fn token(&self, token: &TokenLike) -> Result<Token> {
        self.token_set.get(token).cloned()
    }

    async fn submit(
        &self,
        tx: ZkTx,
        eth_signature: Option<[u8; 65]>,
        fast_processing: Option<bool>,
    ) -> Result<TxHash> {
        let req = SubmitTxRequest {
            tx,
            signature: eth_signature
                .map(|sig| TxEthSignature::EthereumSignature(JsonBytes::from_vec(sig.to_vec()))),
            fast_processing,
        };
        let tx_hash = self.api.submit_tx(&req).await?;
        log::debug!("submitted rollup tx {}", tx_hash);
        Ok(tx_hash)
    }

    /// Send an L1 tx to the rollup contract and pick the serial id of the
    /// priority request it emitted.
    async fn send_priority_op(
        &self,
        wallet: &EthWallet,
        tx: TransactionRequest,
    ) -> Result<PriorityOpHandle> {
        let tx_hash = self.l1.send_transaction(wallet, tx).await?;
        let receipt = self.l1.wait_for_transaction(tx_hash).await?;
        ensure!(receipt.success(), "L1 transaction {:?} reverted", tx_hash);
        let topic = contract::new_priority_request_topic();
        let log = receipt
            .logs
            .iter()
            .find(|log| log.address == self.contract && log.topics.first() == Some(&topic))
            .ok_or_else(|| anyhow!("no priority request emitted by {:?}", tx_hash))?;
        let serial_id = contract::decode_new_priority_request(log.data.as_bytes())?;
        Ok(PriorityOpHandle {
            eth_tx_hash: tx_hash,
            serial_id,
        })
    }

    async fn exit_account_id(
        &self,
        wallet: &SyncWallet,
        account_id: Option<AccountId>,
    ) -> Result<AccountId> {
        match account_id {
            Some(account_id) => Ok(account_id),
            None => Ok(self.committed_account(wallet.address()).await?.account_id),
        }
    }

    async fn send_l1_tx_and_wait(&self, wallet: &EthWallet, tx: TransactionRequest) -> Result<()> {
        let tx_hash = self.l1.send_transaction(wallet, tx).await?;
        let receipt = self.l1.wait_for_transaction(tx_hash).await?;
        ensure!(receipt.success(), "L1 transaction {:?} reverted", tx_hash);
        Ok(())
    }
}

#[async_trait]
impl L2Ops for RollupClient {
    fn token_set(&self) -> &TokenSet {
        &self.token_set
    }

    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn account_info(
        &self,
        account: AccountRef,
        kind: BlockKind,
    ) -> Result<Option<AccountInfo>> {
        self.api.account_info(account, kind).await
    }

    async fn account_full_info(&self, account: AccountRef) -> Result<AccountFullInfo> {
        self.api.account_full_info(account).await
    }

    async fn transaction_fee(
        &self,
        tx_type: TxFeeType,
        address: Address,
        token: &TokenLike,
    ) -> Result<Fee> {
        let req = FeeRequest {
            tx_type,
            address,
            token_like: token.clone(),
        };
        self.api.fee(&req).await
    }

    async fn nft(&self, id: TokenId) -> Result<Option<Nft>> {
        self.api.nft(id).await
    }

    async fn sync_transfer(&self, wallet: &SyncWallet, req: TransferRequest) -> Result<TxHash> {
        let token = self.token(&req.token)?;
        let fee = self
            .resolve_fee(req.fee, TxFeeType::Transfer, req.to, &req.token)
            .await?;
        let account = self.committed_account(wallet.address()).await?;
        let mut tx = Transfer {
            account_id: account.account_id,
            from: wallet.address(),
            to: req.to,
            token: token.id,
            amount: req.amount,
            fee,
            nonce: account.nonce,
            signature: None,
        };
        tx.signature = Some(wallet.signer().sign(&tx.signing_bytes())?);
        let eth_signature = wallet
            .eth_wallet()
            .personal_sign(tx.eth_message(&token).as_bytes())?;
        self.submit(ZkTx::Transfer(Box::new(tx)), Some(eth_signature), None)
            .await
    }

    async fn withdraw_from_sync_to_ethereum(
        &self,
        wallet: &SyncWallet,
        req: WithdrawRequest,
    ) -> Result<TxHash> {
        let token = self.token(&req.token)?;
        let fee = self
            .resolve_fee(
                req.fee,
                TxFeeType::withdraw(req.fast_processing),
                req.eth_address,
                &req.token,
            )
            .await?;
        let account = self.committed_account(wallet.address()).await?;
        let mut tx = Withdraw {
            account_id: account.account_id,
            from: wallet.address(),
            to: req.eth_address,
            token: token.id,
            amount: req.amount,
            fee,
            nonce: account.nonce,
            signature: None,
        };
        tx.signature = Some(wallet.signer().sign(&tx.signing_bytes())?);
        let eth_signature = wallet
            .eth_wallet()
            .personal_sign(tx.eth_message(&token).as_bytes())?;
        self.submit(
            ZkTx::Withdraw(Box::new(tx)),
            Some(eth_signature),
            Some(req.fast_processing),
        )
        .await
    }

    async fn withdraw_nft(&self, wallet: &SyncWallet, req: WithdrawNftRequest) -> Result<TxHash> {
        let fee_token = self.token(&req.fee_token)?;
        let fee = self
            .resolve_fee(
                req.fee,
                TxFeeType::withdraw_nft(req.fast_processing),
                req.to,
                &req.fee_token,
            )
            .await?;
        let account = self.committed_account(wallet.address()).await?;
        let mut tx = WithdrawNft {
            account_id: account.account_id,
            from: wallet.address(),
            to: req.to,
            token: req.token,
            fee_token: fee_token.id,
            fee,
            nonce: account.nonce,
            signature: None,
        };
        tx.signature = Some(wallet.signer().sign(&tx.signing_bytes())?);
        let eth_signature = wallet
            .eth_wallet()
            .personal_sign(tx.eth_message(&fee_token).as_bytes())?;
        self.submit(
            ZkTx::WithdrawNft(Box::new(tx)),
            Some(eth_signature),
            Some(req.fast_processing),
        )
        .await
    }

    async fn set_signing_key(
        &self,
        wallet: &SyncWallet,
        req: ChangePubKeyRequest,
    ) -> Result<TxHash> {
        let fee_token = self.token(&req.fee_token)?;
        let fee = self
            .resolve_fee(
                req.fee,
                TxFeeType::ChangePubKey(req.eth_auth_type),
                wallet.address(),
                &req.fee_token,
            )
            .await?;
        let account = self.committed_account(wallet.address()).await?;
        let mut tx = ChangePubKey {
            account_id: account.account_id,
            account: wallet.address(),
            new_pk_hash: wallet.signer().pub_key_hash(),
            fee_token: fee_token.id,
            fee,
            nonce: account.nonce,
            signature: None,
            eth_auth_data: ChangePubKeyEthAuthData::Onchain,
        };
        tx.eth_auth_data = match req.eth_auth_type {
            ChangePubKeyAuthType::Onchain => ChangePubKeyEthAuthData::Onchain,
            ChangePubKeyAuthType::Ecdsa => {
                let eth_signature = wallet
                    .eth_wallet()
                    .personal_sign(tx.eth_message().as_bytes())?;
                ChangePubKeyEthAuthData::Ecdsa {
                    eth_signature: JsonBytes::from_vec(eth_signature.to_vec()),
                }
            }
            ChangePubKeyAuthType::Create2 => {
                bail!("CREATE2 accounts are not supported by this client")
            }
        };
        tx.signature = Some(wallet.signer().sign(&tx.signing_bytes())?);
        self.submit(ZkTx::ChangePubKey(Box::new(tx)), None, None)
            .await
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt> {
        poll_until(
            &format!("rollup tx {}", tx_hash),
            self.poll_interval,
            self.receipt_timeout,
            || async move {
                let receipt = self.api.tx_receipt(&tx_hash).await?;
                Ok(receipt.filter(|receipt| receipt.status != TxStatus::Queued))
            },
        )
        .await
    }

    async fn await_verify_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt> {
        poll_until(
            &format!("rollup tx {} to finalize", tx_hash),
            self.poll_interval,
            self.receipt_timeout,
            || async move {
                let receipt = self.api.tx_receipt(&tx_hash).await?;
                Ok(receipt.filter(|receipt| {
                    matches!(receipt.status, TxStatus::Finalized | TxStatus::Rejected)
                }))
            },
        )
        .await
    }

    async fn deposit_to_sync_from_ethereum(
        &self,
        wallet: &EthWallet,
        req: DepositRequest,
    ) -> Result<PriorityOpHandle> {
        let token = self.token(&req.token)?;
        let tx = if token.is_eth() {
            TransactionRequest::call(self.contract, contract::deposit_eth(req.deposit_to))
                .with_value(req.amount)
        } else {
            if req.approve_deposit_amount_for_erc20 {
                let approve = contract::approve(self.contract, req.amount);
                self.send_l1_tx_and_wait(wallet, TransactionRequest::call(token.address, approve))
                    .await?;
            }
            TransactionRequest::call(
                self.contract,
                contract::deposit_erc20(token.address, req.amount, req.deposit_to),
            )
        };
        self.send_priority_op(wallet, tx).await
    }

    async fn emergency_withdraw(
        &self,
        wallet: &SyncWallet,
        token: &TokenLike,
        account_id: Option<AccountId>,
    ) -> Result<PriorityOpHandle> {
        let token = self.token(token)?;
        let account_id = self.exit_account_id(wallet, account_id).await?;
        let data = contract::request_full_exit(account_id, token.address);
        self.send_priority_op(
            wallet.eth_wallet(),
            TransactionRequest::call(self.contract, data),
        )
        .await
    }

    async fn emergency_withdraw_nft(
        &self,
        wallet: &SyncWallet,
        token_id: TokenId,
        account_id: Option<AccountId>,
    ) -> Result<PriorityOpHandle> {
        let account_id = self.exit_account_id(wallet, account_id).await?;
        let data = contract::request_full_exit_nft(account_id, token_id);
        self.send_priority_op(
            wallet.eth_wallet(),
            TransactionRequest::call(self.contract, data),
        )
        .await
    }

    async fn await_priority_op_receipt(
        &self,
        handle: &PriorityOpHandle,
    ) -> Result<PriorityOpReceipt> {
        let serial_id = handle.serial_id;
        poll_until(
            &format!("priority op #{}", serial_id),
            self.poll_interval,
            self.receipt_timeout,
            || async move {
                let receipt = self.api.priority_op_receipt(serial_id).await?;
                Ok(receipt.filter(|receipt| receipt.status != TxStatus::Queued))
            },
        )
        .await
    }

    async fn onchain_auth_signing_key(&self, wallet: &SyncWallet) -> Result<H256> {
        let account = self.committed_account(wallet.address()).await?;
        let pub_key_hash = wallet.signer().pub_key_hash();
        let data = contract::set_auth_pubkey_hash(pub_key_hash.as_bytes(), account.nonce);
        self.l1
            .send_transaction(
                wallet.eth_wallet(),
                TransactionRequest::call(self.contract, data),
            )
            .await
    }

    async fn is_onchain_auth_signing_key_set(&self, wallet: &SyncWallet) -> Result<bool> {
        let account = self.committed_account(wallet.address()).await?;
        let data = contract::auth_facts(wallet.address(), account.nonce);
        let output = self.l1.call(self.contract, data).await?;
        let fact = contract::decode_bytes32(&output)?;
        let expected = keccak256(wallet.signer().pub_key_hash().as_bytes());
        Ok(fact == expected)
    }

    async fn withdraw_pending_balance(
        &self,
        wallet: &EthWallet,
        to: Address,
        token: &TokenLike,
        amount: Option<U256>,
    ) -> Result<H256> {
        let token = self.token(token)?;
        let amount = match amount {
            Some(amount) => amount,
            None => {
                let data = contract::get_pending_balance(to, token.address);
                contract::decode_uint(&self.l1.call(self.contract, data).await?)?
            }
        };
        let data = contract::withdraw_pending_balance(to, token.address, amount);
        self.l1
            .send_transaction(wallet, TransactionRequest::call(self.contract, data))
            .await
    }
}
