use anyhow::Result;
use async_trait::async_trait;
use mr_types::{
    account::{AccountFullInfo, AccountId, AccountInfo, AccountRef, AccountType, BlockKind, Nft},
    fee::{Fee, FeeRequest, TxFeeType},
    receipt::{EthReceipt, PriorityOpHandle, PriorityOpReceipt, SerialId, TxReceipt},
    request::{
        ChangePubKeyRequest, DepositRequest, TransactionRequest, TransferRequest,
        WithdrawNftRequest, WithdrawRequest,
    },
    token::{Token, TokenId, TokenLike, TokenSet},
    tx::{SubmitTxRequest, TxHash},
    Address, H256, U256,
};
use mr_utils::{sync_wallet::SyncWallet, wallet::EthWallet};

use crate::rest_client::ApiConfig;

/// What the tooling needs from an Ethereum node.
#[async_trait]
pub trait L1Ops: Send + Sync {
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Read-only contract call at the latest block.
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>>;

    /// Fill in nonce, gas and chain id, sign with `wallet` and broadcast.
    async fn send_transaction(&self, wallet: &EthWallet, tx: TransactionRequest) -> Result<H256>;

    async fn wait_for_transaction(&self, tx_hash: H256) -> Result<EthReceipt>;
}

/// Endpoints of the rollup REST api. Transactions arrive already signed.
#[async_trait]
pub trait RollupApi: Send + Sync {
    async fn config(&self) -> Result<ApiConfig>;

    async fn tokens(&self) -> Result<Vec<Token>>;

    async fn account_info(&self, account: AccountRef, kind: BlockKind)
        -> Result<Option<AccountInfo>>;

    /// Committed and finalized state, both `None` for an unknown account.
    async fn account_full_info(&self, account: AccountRef) -> Result<AccountFullInfo>;

    async fn fee(&self, req: &FeeRequest) -> Result<Fee>;

    async fn submit_tx(&self, req: &SubmitTxRequest) -> Result<TxHash>;

    async fn tx_receipt(&self, tx_hash: &TxHash) -> Result<Option<TxReceipt>>;

    async fn priority_op_receipt(&self, serial_id: SerialId)
        -> Result<Option<PriorityOpReceipt>>;

    async fn nft(&self, id: TokenId) -> Result<Option<Nft>>;
}

/// What the tooling needs from the rollup.
#[async_trait]
pub trait L2Ops: Send + Sync {
    fn token_set(&self) -> &TokenSet;

    /// Address of the rollup contract on L1.
    fn contract_address(&self) -> Address;

    async fn account_info(&self, account: AccountRef, kind: BlockKind)
        -> Result<Option<AccountInfo>>;

    async fn account_full_info(&self, account: AccountRef) -> Result<AccountFullInfo>;

    async fn transaction_fee(
        &self,
        tx_type: TxFeeType,
        address: Address,
        token: &TokenLike,
    ) -> Result<Fee>;

    async fn nft(&self, id: TokenId) -> Result<Option<Nft>>;

    async fn sync_transfer(&self, wallet: &SyncWallet, req: TransferRequest) -> Result<TxHash>;

    async fn withdraw_from_sync_to_ethereum(
        &self,
        wallet: &SyncWallet,
        req: WithdrawRequest,
    ) -> Result<TxHash>;

    async fn withdraw_nft(&self, wallet: &SyncWallet, req: WithdrawNftRequest) -> Result<TxHash>;

    async fn set_signing_key(&self, wallet: &SyncWallet, req: ChangePubKeyRequest)
        -> Result<TxHash>;

    /// Wait until the tx is committed or rejected.
    async fn await_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt>;

    /// Wait until the tx is finalized or rejected.
    async fn await_verify_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt>;

    async fn deposit_to_sync_from_ethereum(
        &self,
        wallet: &EthWallet,
        req: DepositRequest,
    ) -> Result<PriorityOpHandle>;

    /// Request a full exit of one token through the rollup contract. The
    /// committed account of the wallet is exited unless `account_id` is given.
    async fn emergency_withdraw(
        &self,
        wallet: &SyncWallet,
        token: &TokenLike,
        account_id: Option<AccountId>,
    ) -> Result<PriorityOpHandle>;

    async fn emergency_withdraw_nft(
        &self,
        wallet: &SyncWallet,
        token_id: TokenId,
        account_id: Option<AccountId>,
    ) -> Result<PriorityOpHandle>;

    async fn await_priority_op_receipt(&self, handle: &PriorityOpHandle)
        -> Result<PriorityOpReceipt>;

    /// Register the wallet's signing key hash on L1, returns the L1 tx hash.
    async fn onchain_auth_signing_key(&self, wallet: &SyncWallet) -> Result<H256>;

    async fn is_onchain_auth_signing_key_set(&self, wallet: &SyncWallet) -> Result<bool>;

    /// Claim funds the rollup contract holds for `to`, everything when
    /// `amount` is `None`.
    async fn withdraw_pending_balance(
        &self,
        wallet: &EthWallet,
        to: Address,
        token: &TokenLike,
        amount: Option<U256>,
    ) -> Result<H256>;

    async fn get_balance(
        &self,
        address: Address,
        token: &TokenLike,
        kind: BlockKind,
    ) -> Result<U256> {
        let symbol = self.token_set().get(token)?.symbol.clone();
        let info = self.account_info(address.into(), kind).await?;
        Ok(info.map(|info| info.balance(&symbol)).unwrap_or_default())
    }

    async fn get_account_state(&self, address: Address) -> Result<AccountFullInfo> {
        self.account_full_info(address.into()).await
    }

    /// Committed NFT owned by `address`.
    async fn get_nft(&self, address: Address, id: TokenId) -> Result<Option<Nft>> {
        let info = self
            .account_info(address.into(), BlockKind::Committed)
            .await?;
        Ok(info.and_then(|mut info| info.nfts.remove(&id)))
    }

    async fn get_account_type(&self, address: Address) -> Result<Option<AccountType>> {
        let info = self
            .account_info(address.into(), BlockKind::Committed)
            .await?;
        Ok(info.and_then(|info| info.account_type))
    }

    async fn is_signing_key_set(&self, wallet: &SyncWallet) -> Result<bool> {
        let info = self
            .account_info(wallet.address().into(), BlockKind::Committed)
            .await?;
        Ok(info.map(|info| !info.pub_key_hash.is_zero()).unwrap_or(false))
    }

    /// Whether the committed key is the wallet's current signer.
    async fn is_corresponding_signing_key_set(&self, wallet: &SyncWallet) -> Result<bool> {
        let info = self
            .account_info(wallet.address().into(), BlockKind::Committed)
            .await?;
        let signer_hash = wallet.signer().pub_key_hash();
        Ok(info
            .map(|info| info.pub_key_hash == signer_hash)
            .unwrap_or(false))
    }
}
