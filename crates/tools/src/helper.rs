//! Free functions shared by the demo driver and the layer-2 wrapper.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, ensure, Result};
use mr_rpc_client::L2Ops;
use mr_types::{
    account::{AccountFullInfo, AccountInfo, BlockKind},
    fee::TxFeeType,
    receipt::{PriorityOpReceipt, TxReceipt},
    request::{DepositRequest, TransferRequest},
    token::TokenLike,
    Address, U256,
};
use mr_utils::{sync_wallet::SyncWallet, wallet::EthWallet};
use rand::RngCore;

/// Deposit from `depositor`'s L1 account to `deposit_to` on the rollup and
/// wait for the priority operation.
pub async fn deposit_to_sync_from_ethereum(
    provider: &dyn L2Ops,
    depositor: &EthWallet,
    deposit_to: Address,
    token: &TokenLike,
    amount: U256,
    approve: bool,
) -> Result<PriorityOpReceipt> {
    let handle = provider
        .deposit_to_sync_from_ethereum(
            depositor,
            DepositRequest {
                deposit_to,
                token: token.clone(),
                amount,
                approve_deposit_amount_for_erc20: approve,
            },
        )
        .await?;
    provider.await_priority_op_receipt(&handle).await
}

#[derive(Clone, Debug)]
pub struct TransferResult {
    pub receipt: TxReceipt,
    pub fee: U256,
}

/// Transfer with the fee quoted for the receiver; fails if the rollup
/// rejects the transfer.
pub async fn transfer_erc20_token(
    provider: &dyn L2Ops,
    sender: &SyncWallet,
    receiver: Address,
    token: &TokenLike,
    amount: U256,
) -> Result<TransferResult> {
    let fee = provider
        .transaction_fee(TxFeeType::Transfer, receiver, token)
        .await?
        .total_fee;
    let tx_hash = provider
        .sync_transfer(
            sender,
            TransferRequest {
                to: receiver,
                token: token.clone(),
                amount,
                fee: Some(fee),
            },
        )
        .await?;
    let receipt = provider.await_receipt(tx_hash).await?;
    ensure!(
        receipt.success(),
        "Transfer transaction failed with a reason: {}",
        receipt.fail_reason.as_deref().unwrap_or_default()
    );
    Ok(TransferResult { receipt, fee })
}

pub async fn get_rollup_balance(
    provider: &dyn L2Ops,
    address: Address,
    token: &TokenLike,
    kind: BlockKind,
) -> Result<U256> {
    provider.get_balance(address, token, kind).await
}

/// Which account view to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountInfoKind {
    Committed,
    Finalized,
    Full,
}

impl FromStr for AccountInfoKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "committed" => Ok(AccountInfoKind::Committed),
            "finalized" => Ok(AccountInfoKind::Finalized),
            "full" => Ok(AccountInfoKind::Full),
            _ => Err(anyhow!(
                "unknown account info kind {}, expect committed, finalized or full",
                s
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RollupAccountInfo {
    Single(Option<AccountInfo>),
    Full(AccountFullInfo),
}

impl fmt::Display for RollupAccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = match self {
            RollupAccountInfo::Single(info) => serde_json::to_string_pretty(info),
            RollupAccountInfo::Full(info) => serde_json::to_string_pretty(info),
        }
        .map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

pub async fn get_rollup_account_info(
    provider: &dyn L2Ops,
    address: Address,
    kind: AccountInfoKind,
) -> Result<RollupAccountInfo> {
    let info = match kind {
        AccountInfoKind::Committed => RollupAccountInfo::Single(
            provider
                .account_info(address.into(), BlockKind::Committed)
                .await?,
        ),
        AccountInfoKind::Finalized => RollupAccountInfo::Single(
            provider
                .account_info(address.into(), BlockKind::Finalized)
                .await?,
        ),
        AccountInfoKind::Full => {
            RollupAccountInfo::Full(provider.account_full_info(address.into()).await?)
        }
    };
    Ok(info)
}

/// Fetch the full, committed and finalized views concurrently.
pub async fn get_rollup_account_infos(
    provider: &dyn L2Ops,
    address: Address,
) -> Result<(AccountFullInfo, Option<AccountInfo>, Option<AccountInfo>)> {
    tokio::try_join!(
        provider.account_full_info(address.into()),
        provider.account_info(address.into(), BlockKind::Committed),
        provider.account_info(address.into(), BlockKind::Finalized),
    )
}

pub fn random_bytes(length: usize) -> Vec<u8> {
    let mut buf = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}
