//! Single-operation commands of the CLI.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use mr_config::Config;
use mr_types::{
    account::{AccountId, BlockKind},
    token::TokenLike,
    units::format_ether,
    Address,
};
use mr_utils::wallet::EthWallet;

use crate::{
    helper::{self, AccountInfoKind},
    l1_client::EthClient,
    l2_client::L2Client,
    utils::connect,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    L1,
    L2,
}

impl FromStr for Layer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l1" => Ok(Layer::L1),
            "l2" => Ok(Layer::L2),
            _ => Err(anyhow!("unknown layer {}, expect l1 or l2", s)),
        }
    }
}

async fn clients(config: &Config) -> Result<(EthClient, L2Client)> {
    let (l1, l2) = connect(config).await?;
    let eth_client = EthClient::init(config, l1.clone(), l2.clone())?;
    let l2_client = L2Client::init(config.network, l1, l2, eth_client.eth_wallet().clone())?;
    Ok((eth_client, l2_client))
}

pub fn parse_address(s: &str) -> Result<Address> {
    Address::from_str(s).map_err(|err| anyhow!("invalid address {}: {}", s, err))
}

/// Deposit from the funding wallet to `to`.
pub async fn deposit(
    config: &Config,
    to: Address,
    token: &str,
    amount: &str,
    approve: bool,
) -> Result<()> {
    let (_, l2_client) = clients(config).await?;
    let amount = l2_client.parse_token(token, amount)?;
    l2_client
        .deposit_erc20_token(to, token, amount, approve)
        .await
}

pub async fn transfer(
    config: &Config,
    privkey: &str,
    to: Address,
    token: &str,
    amount: &str,
) -> Result<()> {
    let (_, mut l2_client) = clients(config).await?;
    let sender = EthWallet::from_privkey_str(privkey)?;
    let amount = l2_client.parse_token(token, amount)?;
    l2_client
        .transfer_erc20_token(&sender, to, token, amount)
        .await?;
    log::info!(
        "transferred {} {} from {:?} to {:?}, fee: {}",
        l2_client.format_balance(token, amount)?,
        token,
        sender.address(),
        to,
        l2_client.format_balance(token, l2_client.running_fee())?
    );
    Ok(())
}

pub async fn withdraw(
    config: &Config,
    privkey: &str,
    token: &str,
    amount: &str,
    fast: bool,
) -> Result<()> {
    let (_, mut l2_client) = clients(config).await?;
    let wallet = EthWallet::from_privkey_str(privkey)?;
    let amount = l2_client.parse_token(token, amount)?;
    let tx_hash = l2_client
        .withdraw_to_ethereum(&wallet, token, amount, fast)
        .await?;
    log::info!("withdraw tx: {}", tx_hash);
    Ok(())
}

/// Full exit of `token` followed by claiming the pending balance.
pub async fn full_exit(
    config: &Config,
    privkey: &str,
    token: &str,
    account_id: Option<AccountId>,
) -> Result<()> {
    let (_, l2_client) = clients(config).await?;
    let wallet = EthWallet::from_privkey_str(privkey)?;
    let (before, after) = l2_client.full_exit(&wallet, token, account_id).await?;
    log::info!(
        "{:?} {} balances: {} -> {}",
        wallet.address(),
        token,
        l2_client.format_balance(token, before)?,
        l2_client.format_balance(token, after)?
    );
    l2_client
        .withdraw_pending_balance(&wallet, token, None)
        .await?;
    Ok(())
}

pub async fn get_balance(config: &Config, address: Address, token: &str, layer: Layer) -> Result<()> {
    let (mut eth_client, l2_client) = clients(config).await?;
    let is_eth = l2_client
        .provider()
        .token_set()
        .is_eth(&TokenLike::from(token));
    let balance = match layer {
        Layer::L1 if is_eth => eth_client.get_balance(address).await?,
        Layer::L1 => eth_client.get_erc20_balance(address, token).await?,
        Layer::L2 => {
            helper::get_rollup_balance(
                l2_client.provider(),
                address,
                &TokenLike::from(token),
                BlockKind::Committed,
            )
            .await?
        }
    };
    let formatted = if is_eth {
        format_ether(balance)
    } else {
        l2_client.format_balance(token, balance)?
    };
    log::info!("Balance: {} {}", formatted, token);
    Ok(())
}

/// Print one account view, or all three when `kind` is `None`.
pub async fn account_info(
    config: &Config,
    address: Address,
    kind: Option<AccountInfoKind>,
) -> Result<()> {
    let (_, l2_client) = clients(config).await?;
    let provider = l2_client.provider();
    match kind {
        Some(kind) => {
            let info = helper::get_rollup_account_info(provider, address, kind).await?;
            println!("{}", info);
        }
        None => {
            let (full, committed, finalized) =
                helper::get_rollup_account_infos(provider, address).await?;
            println!("{}", helper::RollupAccountInfo::Full(full));
            println!("{}", helper::RollupAccountInfo::Single(committed));
            println!("{}", helper::RollupAccountInfo::Single(finalized));
        }
    }
    Ok(())
}
