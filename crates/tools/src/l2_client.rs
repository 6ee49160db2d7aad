use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use mr_config::Network;
use mr_rpc_client::{L1Ops, L2Ops};
use mr_types::{
    account::{AccountFullInfo, AccountId, AccountInfo, AccountRef, AccountType, BlockKind},
    fee::{ChangePubKeyAuthType, TxFeeType},
    receipt::EthReceipt,
    request::{ChangePubKeyRequest, WithdrawNftRequest, WithdrawRequest},
    token::TokenLike,
    tx::TxHash,
    Address, U256,
};
use mr_utils::{signer::Signer, sync_wallet::SyncWallet, wallet::EthWallet};

use crate::helper;

/// Layer-2 side of the demo. Every operation submits, waits for the
/// receipt, checks the outcome and fails with a descriptive error otherwise.
pub struct L2Client {
    network: Network,
    l1: Arc<dyn L1Ops>,
    provider: Arc<dyn L2Ops>,
    sync_wallet: SyncWallet,
    running_fee: U256,
}

impl L2Client {
    /// `eth_wallet` pays for deposits.
    pub fn init(
        network: Network,
        l1: Arc<dyn L1Ops>,
        provider: Arc<dyn L2Ops>,
        eth_wallet: EthWallet,
    ) -> Result<Self> {
        let sync_wallet = SyncWallet::from_eth_signer(eth_wallet)?;
        Ok(L2Client {
            network,
            l1,
            provider,
            sync_wallet,
            running_fee: U256::zero(),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn provider(&self) -> &dyn L2Ops {
        &*self.provider
    }

    pub fn sync_wallet(&self) -> &SyncWallet {
        &self.sync_wallet
    }

    pub fn create_l2_wallet(&self, eth_wallet: &EthWallet) -> Result<SyncWallet> {
        SyncWallet::from_eth_signer(eth_wallet.clone())
    }

    pub fn parse_token(&self, token: &str, amount: &str) -> Result<U256> {
        self.provider
            .token_set()
            .parse_token(&TokenLike::from(token), amount)
    }

    pub fn format_balance(&self, token: &str, amount: U256) -> Result<String> {
        self.provider
            .token_set()
            .format_token(&TokenLike::from(token), amount)
    }

    pub fn running_fee(&self) -> U256 {
        self.running_fee
    }

    pub fn reset_running_fee(&mut self) {
        self.running_fee = U256::zero();
    }

    async fn balance(&self, address: Address, token: &str) -> Result<U256> {
        helper::get_rollup_balance(
            self.provider(),
            address,
            &TokenLike::from(token),
            BlockKind::Committed,
        )
        .await
    }

    /// Register the wallet's signing key. Does nothing if a key is already set.
    pub async fn change_pub_key(
        &mut self,
        wallet: &mut SyncWallet,
        fee_token: &str,
        onchain: bool,
    ) -> Result<()> {
        let provider = Arc::clone(&self.provider);
        if provider.is_signing_key_set(wallet).await? {
            return Ok(());
        }

        let auth_type = if onchain {
            ChangePubKeyAuthType::Onchain
        } else {
            ChangePubKeyAuthType::Ecdsa
        };
        let fee_token = TokenLike::from(fee_token);
        let fee = provider
            .transaction_fee(
                TxFeeType::ChangePubKey(auth_type),
                wallet.address(),
                &fee_token,
            )
            .await?
            .total_fee;

        if onchain {
            let tx_hash = provider.onchain_auth_signing_key(wallet).await?;
            self.l1.wait_for_transaction(tx_hash).await?;
            ensure!(
                provider.is_onchain_auth_signing_key_set(wallet).await?,
                "ChangePubKey is unset onchain"
            );
        }

        let tx_hash = provider
            .set_signing_key(
                wallet,
                ChangePubKeyRequest {
                    fee_token,
                    fee: Some(fee),
                    eth_auth_type: auth_type,
                },
            )
            .await?;
        let receipt = provider.await_receipt(tx_hash).await?;
        ensure!(
            receipt.success(),
            "ChangePubKey transaction failed with a reason: {}",
            receipt.fail_reason.as_deref().unwrap_or_default()
        );
        ensure!(
            provider.is_signing_key_set(wallet).await?,
            "ChangePubKey failed"
        );
        ensure!(
            provider.is_corresponding_signing_key_set(wallet).await?,
            "ChangePubKey failed"
        );

        let old_signer = wallet.replace_signer(Signer::from_seed(&helper::random_bytes(32))?);
        let key_set = provider.is_signing_key_set(wallet).await;
        let corresponding = provider.is_corresponding_signing_key_set(wallet).await;
        wallet.replace_signer(old_signer);
        let (key_set, corresponding) = (key_set?, corresponding?);
        ensure!(key_set, "ChangePubKey failed");
        ensure!(!corresponding, "Wrong signer for ChangePubKey failed");
        ensure!(
            provider.is_corresponding_signing_key_set(wallet).await?,
            "ChangePubKey failed"
        );

        let account_type = provider.get_account_type(wallet.address()).await?;
        ensure!(
            account_type == Some(AccountType::Owned),
            "Incorrect account type"
        );

        self.running_fee += fee;
        Ok(())
    }

    /// Deposit from the client's own L1 wallet to `deposit_to`.
    pub async fn deposit_erc20_token(
        &self,
        deposit_to: Address,
        token: &str,
        amount: U256,
        approve: bool,
    ) -> Result<()> {
        let balance_before = self.format_balance(token, self.balance(deposit_to, token).await?)?;
        let receipt = helper::deposit_to_sync_from_ethereum(
            self.provider(),
            self.sync_wallet.eth_wallet(),
            deposit_to,
            &TokenLike::from(token),
            amount,
            approve,
        )
        .await?;
        ensure!(receipt.executed(), "Deposit was not executed");
        let balance_after = self.format_balance(token, self.balance(deposit_to, token).await?)?;
        log::info!(
            "L2#balances after deposit {} {}: {} -> {}",
            self.format_balance(token, amount)?,
            token,
            balance_before,
            balance_after
        );
        Ok(())
    }

    pub async fn transfer_erc20_token(
        &mut self,
        sender: &EthWallet,
        recipient: Address,
        token: &str,
        amount: U256,
    ) -> Result<()> {
        let sender = self.create_l2_wallet(sender)?;
        let sender_before = self.balance(sender.address(), token).await?;
        let receiver_before = self.balance(recipient, token).await?;

        let helper::TransferResult { fee, .. } = helper::transfer_erc20_token(
            self.provider(),
            &sender,
            recipient,
            &TokenLike::from(token),
            amount,
        )
        .await?;

        let sender_after = self.balance(sender.address(), token).await?;
        let receiver_after = self.balance(recipient, token).await?;
        if sender.address() == recipient {
            ensure!(
                sender_before.checked_sub(fee) == Some(sender_after),
                "Transfer to self failed"
            );
        } else {
            ensure!(
                sender_before.checked_sub(sender_after) == Some(amount + fee),
                "Transfer failed (incorrect sender balance)"
            );
            ensure!(
                receiver_after.checked_sub(receiver_before) == Some(amount),
                "Transfer failed (incorrect receiver balance)"
            );
        }

        self.running_fee += fee;
        Ok(())
    }

    pub async fn get_account_info(
        &self,
        account: AccountRef,
        kind: BlockKind,
    ) -> Result<Option<AccountInfo>> {
        self.provider.account_info(account, kind).await
    }

    pub async fn get_account_full_info(&self, account: AccountRef) -> Result<AccountFullInfo> {
        self.provider.account_full_info(account).await
    }

    /// Withdraw to the wallet's own L1 address.
    pub async fn withdraw_to_ethereum(
        &mut self,
        eth_wallet: &EthWallet,
        token: &str,
        amount: U256,
        fast_processing: bool,
    ) -> Result<TxHash> {
        let wallet = self.create_l2_wallet(eth_wallet)?;
        let address = wallet.address();
        let token_like = TokenLike::from(token);
        let fee = self
            .provider
            .transaction_fee(TxFeeType::withdraw(fast_processing), address, &token_like)
            .await?
            .total_fee;
        let balance_before = self.balance(address, token).await?;

        let tx_hash = self
            .provider
            .withdraw_from_sync_to_ethereum(
                &wallet,
                WithdrawRequest {
                    eth_address: address,
                    token: token_like,
                    amount,
                    fee: Some(fee),
                    fast_processing,
                },
            )
            .await?;
        let receipt = self.provider.await_receipt(tx_hash).await?;
        ensure!(
            receipt.success(),
            "Withdraw transaction failed with a reason: {}",
            receipt.fail_reason.as_deref().unwrap_or_default()
        );

        let balance_after = self.balance(address, token).await?;
        ensure!(
            balance_before.checked_sub(balance_after) == Some(amount + fee),
            "Wrong amount in wallet after withdraw"
        );
        self.running_fee += fee;
        Ok(tx_hash)
    }

    /// Withdraw the first committed NFT of the wallet and wait until the
    /// withdrawal is finalized.
    pub async fn withdraw_nft(
        &mut self,
        eth_wallet: &EthWallet,
        fee_token: &str,
        fast_processing: bool,
    ) -> Result<()> {
        let wallet = self.create_l2_wallet(eth_wallet)?;
        let address = wallet.address();
        let fee_token = TokenLike::from(fee_token);
        let fee = self
            .provider
            .transaction_fee(TxFeeType::withdraw_nft(fast_processing), address, &fee_token)
            .await?
            .total_fee;

        let state = self.provider.get_account_state(address).await?;
        let nft = state
            .committed
            .and_then(|info| info.nfts.into_values().next())
            .ok_or_else(|| anyhow!("Account does not have an NFT initially"))?;
        let before = self.provider.get_nft(address, nft.id).await?;
        ensure!(
            before.map(|n| n.id) == Some(nft.id),
            "Account does not have an NFT initially"
        );

        let tx_hash = self
            .provider
            .withdraw_nft(
                &wallet,
                WithdrawNftRequest {
                    to: address,
                    token: nft.id,
                    fee_token,
                    fee: Some(fee),
                    fast_processing,
                },
            )
            .await?;
        let receipt = self.provider.await_receipt(tx_hash).await?;
        ensure!(
            receipt.success(),
            "Withdraw transaction failed with a reason: {}",
            receipt.fail_reason.as_deref().unwrap_or_default()
        );
        ensure!(
            self.provider.get_nft(address, nft.id).await?.is_none(),
            "Account has an NFT after withdrawing"
        );

        self.provider.await_verify_receipt(tx_hash).await?;
        self.running_fee += fee;
        Ok(())
    }

    /// Emergency exit of one token, returns the balances before and after.
    /// `account_id` overrides the committed account of the wallet.
    pub async fn full_exit(
        &self,
        eth_wallet: &EthWallet,
        token: &str,
        account_id: Option<AccountId>,
    ) -> Result<(U256, U256)> {
        let wallet = self.create_l2_wallet(eth_wallet)?;
        let balance_before = self.balance(wallet.address(), token).await?;
        let handle = self
            .provider
            .emergency_withdraw(&wallet, &TokenLike::from(token), account_id)
            .await?;
        let receipt = self.provider.await_priority_op_receipt(&handle).await?;
        ensure!(receipt.executed(), "Full Exit was not executed");
        let balance_after = self.balance(wallet.address(), token).await?;
        Ok((balance_before, balance_after))
    }

    /// Emergency exit of the first finalized NFT of the wallet.
    pub async fn full_exit_nft(
        &self,
        eth_wallet: &EthWallet,
        account_id: Option<AccountId>,
    ) -> Result<()> {
        let wallet = self.create_l2_wallet(eth_wallet)?;
        let address = wallet.address();
        let state = self.provider.get_account_state(address).await?;
        let nft = state
            .finalized
            .and_then(|info| info.nfts.into_values().next())
            .ok_or_else(|| anyhow!("Account does not have an NFT initially"))?;
        let before = self.provider.get_nft(address, nft.id).await?;
        ensure!(
            before.map(|n| n.id) == Some(nft.id),
            "Account does not have an NFT initially"
        );

        let handle = self
            .provider
            .emergency_withdraw_nft(&wallet, nft.id, account_id)
            .await?;
        let receipt = self.provider.await_priority_op_receipt(&handle).await?;
        ensure!(receipt.executed(), "NFT Full Exit was not executed");
        ensure!(
            self.provider.get_nft(address, nft.id).await?.is_none(),
            "Account has an NFT after Full Exit"
        );
        Ok(())
    }

    /// Claim the L1 pending balance of the wallet, all of it without `amount`.
    pub async fn withdraw_pending_balance(
        &self,
        eth_wallet: &EthWallet,
        token: &str,
        amount: Option<U256>,
    ) -> Result<EthReceipt> {
        let address = eth_wallet.address();
        let tx_hash = self
            .provider
            .withdraw_pending_balance(eth_wallet, address, &TokenLike::from(token), amount)
            .await?;
        let receipt = self.l1.wait_for_transaction(tx_hash).await?;
        log::info!(
            "WithdrawPendingBalance token {} from address {:?} with tx {:?}, status: {:?}",
            token,
            address,
            receipt.transaction_hash,
            receipt.status
        );
        Ok(receipt)
    }
}
