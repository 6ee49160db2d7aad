use std::{str::FromStr, time::Duration};

use anyhow::{anyhow, Result};
use mr_config::{Config, DemoConfig};
use mr_types::{account::BlockKind, units::format_ether, Address, U256};
use mr_utils::{sync_wallet::SyncWallet, wallet::EthWallet};

use crate::{helper, l1_client::EthClient, l2_client::L2Client, utils::connect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    Demo,
    Seeded,
    Batch,
    L1Log,
    L2Log,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Demo
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "demo" => Ok(Scenario::Demo),
            "seeded" => Ok(Scenario::Seeded),
            "batch" => Ok(Scenario::Batch),
            "l1-log" => Ok(Scenario::L1Log),
            "l2-log" => Ok(Scenario::L2Log),
            _ => Err(anyhow!(
                "unknown scenario {}, expect one of demo, seeded, batch, l1-log, l2-log",
                s
            )),
        }
    }
}

/// A named participant with both of its wallets.
pub struct Actor {
    pub name: String,
    pub eth: EthWallet,
    pub l2: SyncWallet,
}

impl Actor {
    pub fn address(&self) -> Address {
        self.eth.address()
    }
}

pub struct Demo {
    config: DemoConfig,
    eth_client: EthClient,
    l2_client: L2Client,
    alice: Actor,
    bob: Actor,
}

impl Demo {
    /// Load (or create and fund) the two actors.
    pub async fn init(
        config: DemoConfig,
        mut eth_client: EthClient,
        l2_client: L2Client,
    ) -> Result<Self> {
        log::info!("-----Init addresses-----");
        let eth = eth_client.load_wallet(&config.alice, None).await?;
        let alice = Actor {
            name: config.alice.name.clone(),
            l2: l2_client.create_l2_wallet(&eth)?,
            eth,
        };
        let eth = eth_client.load_wallet(&config.bob, None).await?;
        let bob = Actor {
            name: config.bob.name.clone(),
            l2: l2_client.create_l2_wallet(&eth)?,
            eth,
        };
        log::info!("{} address: {:?}", alice.name, alice.address());
        log::info!("{} address: {:?}", bob.name, bob.address());

        Ok(Demo {
            config,
            eth_client,
            l2_client,
            alice,
            bob,
        })
    }

    pub async fn connect(config: &Config) -> Result<Self> {
        let (l1, l2) = connect(config).await?;
        let eth_client = EthClient::init(config, l1.clone(), l2.clone())?;
        let l2_client = L2Client::init(config.network, l1, l2, eth_client.eth_wallet().clone())?;
        Self::init(config.demo.clone(), eth_client, l2_client).await
    }

    pub fn alice(&self) -> &Actor {
        &self.alice
    }

    pub fn bob(&self) -> &Actor {
        &self.bob
    }

    pub fn eth_client(&self) -> &EthClient {
        &self.eth_client
    }

    pub fn l2_client(&self) -> &L2Client {
        &self.l2_client
    }

    fn format_balance(&self, token: &str, amount: U256) -> Result<String> {
        if token == self.config.eth_token {
            Ok(format_ether(amount))
        } else {
            self.l2_client.format_balance(token, amount)
        }
    }

    /// `ETH:1.0;DAI:250.0`, the balances of one actor on L1.
    async fn l1_balances(&mut self, address: Address) -> Result<String> {
        let mut balances = vec![format!(
            "{}:{}",
            self.config.eth_token,
            format_ether(self.eth_client.get_balance(address).await?)
        )];
        for token in self.config.tokens.clone() {
            let balance = self.eth_client.get_erc20_balance(address, &token).await?;
            balances.push(format!("{}:{}", token, self.format_balance(&token, balance)?));
        }
        Ok(balances.join(";"))
    }

    async fn l2_balances(&self, address: Address) -> Result<String> {
        let mut balances = Vec::with_capacity(self.config.tokens.len() + 1);
        for token in std::iter::once(&self.config.eth_token).chain(self.config.tokens.iter()) {
            let balance = helper::get_rollup_balance(
                self.l2_client.provider(),
                address,
                &token.as_str().into(),
                BlockKind::Committed,
            )
            .await?;
            balances.push(format!("{}:{}", token, self.format_balance(token, balance)?));
        }
        Ok(balances.join(";"))
    }

    pub async fn log_l1_balances(&mut self) -> Result<()> {
        let alice = self.l1_balances(self.alice.address()).await?;
        let bob = self.l1_balances(self.bob.address()).await?;
        log::info!("L1#{} balances: {}", self.alice.name, alice);
        log::info!("L1#{} balances: {}", self.bob.name, bob);
        Ok(())
    }

    pub async fn log_l2_balances(&self) -> Result<()> {
        let alice = self.l2_balances(self.alice.address()).await?;
        let bob = self.l2_balances(self.bob.address()).await?;
        log::info!("L2#{} balances: {}", self.alice.name, alice);
        log::info!("L2#{} balances: {}", self.bob.name, bob);
        Ok(())
    }

    /// Alice gets ETH on the rollup, registers her key and pays a quarter
    /// to Bob, who registers his key too.
    pub async fn init_eth_data(&mut self) -> Result<()> {
        log::info!("InitETHData");
        let token = self.config.eth_token.clone();
        let amount = self
            .l2_client
            .parse_token(&token, &self.config.deposit_amount)?;
        self.l2_client
            .deposit_erc20_token(self.alice.address(), &token, amount, true)
            .await?;
        self.l2_client
            .change_pub_key(&mut self.alice.l2, &token, true)
            .await?;
        self.l2_client
            .transfer_erc20_token(&self.alice.eth, self.bob.address(), &token, amount / 4)
            .await?;
        self.l2_client
            .change_pub_key(&mut self.bob.l2, &token, true)
            .await?;
        Ok(())
    }

    pub async fn init_erc20_data(&mut self) -> Result<()> {
        log::info!("InitERC20Data");
        for token in self.config.tokens.clone() {
            log::info!(
                "L2#Deposit {} ERC20 token {} to {} address {:?}",
                self.config.deposit_amount,
                token,
                self.alice.name,
                self.alice.address()
            );
            let amount = self
                .l2_client
                .parse_token(&token, &self.config.deposit_amount)?;
            self.l2_client
                .deposit_erc20_token(self.alice.address(), &token, amount, true)
                .await?;
            log::info!(
                "L2#Transfer {} ERC20 token {} from {} with address {:?} to {} with address {:?}",
                self.format_balance(&token, amount / 4)?,
                token,
                self.alice.name,
                self.alice.address(),
                self.bob.name,
                self.bob.address()
            );
            self.l2_client
                .transfer_erc20_token(&self.alice.eth, self.bob.address(), &token, amount / 4)
                .await?;
        }
        Ok(())
    }

    /// Bob withdraws the configured amount of every token with fast processing.
    pub async fn withdraw_to_ethereum(&mut self) -> Result<()> {
        let amount = self.config.withdraw_amount.clone();
        for token in std::iter::once(self.config.eth_token.clone()).chain(self.config.tokens.clone())
        {
            log::info!(
                "L2#Withdraw {} {} from {} address {:?}",
                amount,
                token,
                self.bob.name,
                self.bob.address()
            );
            let value = self.l2_client.parse_token(&token, &amount)?;
            let tx_hash = self
                .l2_client
                .withdraw_to_ethereum(&self.bob.eth, &token, value, true)
                .await?;
            log::debug!("withdraw tx: {}", tx_hash);
        }
        Ok(())
    }

    /// Emergency exit of every token for both actors, each followed by
    /// claiming the pending balance on L1.
    pub async fn full_exit(&mut self) -> Result<()> {
        for token in std::iter::once(self.config.eth_token.clone()).chain(self.config.tokens.clone())
        {
            for actor in [&self.alice, &self.bob] {
                let (before, after) = self.l2_client.full_exit(&actor.eth, &token, None).await?;
                self.l2_client
                    .withdraw_pending_balance(&actor.eth, &token, None)
                    .await?;
                log::info!(
                    "{} {} balances: {} -> {}",
                    actor.name,
                    token,
                    self.format_balance(&token, before)?,
                    self.format_balance(&token, after)?
                );
            }
        }
        Ok(())
    }

    /// Repeated small deposits to Alice and transfers to Bob, then every
    /// account view of both actors.
    pub async fn batch(&mut self) -> Result<()> {
        let token = self.config.eth_token.clone();
        let batch_size = self.config.batch_size.max(1);
        let total = self
            .l2_client
            .parse_token(&token, &self.config.deposit_amount)?;
        let amount = total / U256::from(batch_size);

        self.l2_client
            .deposit_erc20_token(self.alice.address(), &token, amount, true)
            .await?;
        self.l2_client
            .change_pub_key(&mut self.alice.l2, &token, true)
            .await?;
        for i in 0..batch_size {
            log::info!("batch {}/{}", i + 1, batch_size);
            if i > 0 {
                self.l2_client
                    .deposit_erc20_token(self.alice.address(), &token, amount, true)
                    .await?;
            }
            self.l2_client
                .transfer_erc20_token(&self.alice.eth, self.bob.address(), &token, amount / 2)
                .await?;
        }

        for actor in [&self.alice, &self.bob] {
            let (full, committed, finalized) =
                helper::get_rollup_account_infos(self.l2_client.provider(), actor.address())
                    .await?;
            log::info!(
                "{} account infos:\nfull: {}\ncommitted: {}\nfinalized: {}",
                actor.name,
                helper::RollupAccountInfo::Full(full),
                helper::RollupAccountInfo::Single(committed),
                helper::RollupAccountInfo::Single(finalized)
            );
        }
        Ok(())
    }

    pub async fn sleeping(&self) {
        log::info!("Waiting for {} ms", self.config.sleep_ms);
        tokio::time::sleep(Duration::from_millis(self.config.sleep_ms)).await;
    }

    pub async fn run(&mut self, scenario: Scenario) -> Result<()> {
        match scenario {
            Scenario::L1Log => return self.log_l1_balances().await,
            Scenario::L2Log => return self.log_l2_balances().await,
            Scenario::Batch => return self.batch().await,
            Scenario::Seeded => {
                self.log_l1_balances().await?;
                self.log_l2_balances().await?;
                log::info!("-----Init data-----");
                self.init_eth_data().await?;
                self.init_erc20_data().await?;
                self.sleeping().await;
                log::info!("-----After init data-----");
                self.log_l1_balances().await?;
                self.log_l2_balances().await?;
            }
            Scenario::Demo => {}
        }

        log::info!("-----Withdraw to Ethereum-----");
        self.withdraw_to_ethereum().await?;
        self.sleeping().await;
        log::info!("-----After withdrawal-----");
        self.log_l1_balances().await?;
        self.log_l2_balances().await?;
        log::info!("-----Full exit-----");
        self.full_exit().await?;
        self.sleeping().await;
        log::info!("-----After full exit-----");
        self.log_l1_balances().await?;
        self.log_l2_balances().await?;

        log::info!(
            "running fee: L1 {} ETH, L2 {} ETH",
            format_ether(self.eth_client.running_fee()),
            format_ether(self.l2_client.running_fee())
        );
        Ok(())
    }
}

pub async fn run(config: &Config, scenario: Scenario) -> Result<()> {
    let mut demo = Demo::connect(config).await?;
    demo.run(scenario).await
}
