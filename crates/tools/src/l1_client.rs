use std::{collections::HashMap, sync::Arc};

use anyhow::{ensure, Result};
use mr_config::{ActorConfig, Config, Network, DEFAULT_DERIVATION_PATH};
use mr_rpc_client::{L1Ops, L2Ops};
use mr_types::{request::TransactionRequest, token::TokenLike, units::parse_ether, Address, U256};
use mr_utils::wallet::EthWallet;

use crate::erc20::Erc20Contract;

/// Layer-1 side of the demo: balances, wallet funding and a cache of token
/// contract handles.
pub struct EthClient {
    network: Network,
    l1: Arc<dyn L1Ops>,
    l2: Arc<dyn L2Ops>,
    eth_wallet: EthWallet,
    running_fee: U256,
    contracts: HashMap<String, Erc20Contract>,
}

impl EthClient {
    pub fn new(
        network: Network,
        l1: Arc<dyn L1Ops>,
        l2: Arc<dyn L2Ops>,
        eth_wallet: EthWallet,
    ) -> Self {
        EthClient {
            network,
            l1,
            l2,
            eth_wallet,
            running_fee: U256::zero(),
            contracts: HashMap::new(),
        }
    }

    /// Use the funding wallet configured for the network.
    pub fn init(config: &Config, l1: Arc<dyn L1Ops>, l2: Arc<dyn L2Ops>) -> Result<Self> {
        let funding = &config.l1.funding;
        let eth_wallet = EthWallet::from_mnemonic(&funding.mnemonic, &funding.derivation_path)?;
        log::info!(
            "[{}] funding wallet: {:?}",
            config.network.as_str(),
            eth_wallet.address()
        );
        Ok(Self::new(config.network, l1, l2, eth_wallet))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn eth_wallet(&self) -> &EthWallet {
        &self.eth_wallet
    }

    pub fn running_fee(&self) -> U256 {
        self.running_fee
    }

    pub fn reset_running_fee(&mut self) {
        self.running_fee = U256::zero();
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.l1.get_balance(address).await
    }

    /// The contract handle of `token`, resolved through the rollup token set
    /// the first time it is needed.
    pub fn erc20_contract(&mut self, token: &str) -> Result<&Erc20Contract> {
        if !self.contracts.contains_key(token) {
            let address = self
                .l2
                .token_set()
                .get(&TokenLike::Symbol(token.to_string()))?
                .address;
            log::debug!("cache contract of {} at {:?}", token, address);
            self.contracts
                .insert(token.to_string(), Erc20Contract::new(token, address));
        }
        Ok(&self.contracts[token])
    }

    pub fn cached_contract(&self, token: &str) -> Option<&Erc20Contract> {
        self.contracts.get(token)
    }

    pub async fn get_erc20_balance(&mut self, address: Address, token: &str) -> Result<U256> {
        let contract = self.erc20_contract(token)?.clone();
        contract.balance_of(&*self.l1, address).await
    }

    /// A fresh random wallet, funded with `amount` ether when given.
    pub async fn create_random_wallet(&mut self, amount: Option<&str>) -> Result<EthWallet> {
        let wallet = EthWallet::random()?;
        if let Some(amount) = amount {
            self.fund(wallet.address(), amount).await?;
        }
        Ok(wallet)
    }

    /// Wallet of a named actor. Actors without a key get a new random wallet
    /// funded with `amount` (or the actor's `fund`) ether.
    pub async fn load_wallet(
        &mut self,
        actor: &ActorConfig,
        amount: Option<&str>,
    ) -> Result<EthWallet> {
        if let Some(mnemonic) = &actor.mnemonic {
            return EthWallet::from_mnemonic(mnemonic, DEFAULT_DERIVATION_PATH);
        }
        if let Some(private_key) = &actor.private_key {
            return EthWallet::from_privkey_str(private_key);
        }
        let wallet = EthWallet::random()?;
        log::info!(
            "{} wallet address: {:?} private key: {:?}",
            actor.name,
            wallet.address(),
            wallet.privkey()
        );
        if let Some(amount) = amount.or(actor.fund.as_deref()) {
            self.fund(wallet.address(), amount).await?;
        }
        Ok(wallet)
    }

    async fn fund(&mut self, to: Address, amount: &str) -> Result<()> {
        let value = parse_ether(amount)?;
        let tx_hash = self
            .l1
            .send_transaction(&self.eth_wallet, TransactionRequest::transfer(to, value))
            .await?;
        let receipt = self.l1.wait_for_transaction(tx_hash).await?;
        ensure!(receipt.success(), "funding transaction {:?} failed", tx_hash);
        self.running_fee += receipt.fee();
        log::info!("funded {:?} with {} ETH", to, amount);
        Ok(())
    }
}
