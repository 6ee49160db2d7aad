use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Localhost,
    Goerli,
}

impl Default for Network {
    fn default() -> Self {
        Network::Localhost
    }
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Localhost => "localhost",
            Network::Goerli => "goerli",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub l1: L1Config,
    #[serde(default)]
    pub l2: L2Config,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub up: UpConfig,
}

/// Wallet used to fund freshly created accounts and to pay deposits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingWalletConfig {
    pub mnemonic: String,
    pub derivation_path: String,
}

impl Default for FundingWalletConfig {
    fn default() -> Self {
        FundingWalletConfig {
            mnemonic: DEFAULT_TEST_MNEMONIC.to_string(),
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct L1Config {
    pub rpc_url: String,
    /// Fixed gas limit, estimated per transaction when unset.
    pub gas_limit: Option<u64>,
    pub funding: FundingWalletConfig,
}

impl Default for L1Config {
    fn default() -> Self {
        L1Config {
            rpc_url: DEFAULT_L1_RPC_URL.to_string(),
            gas_limit: None,
            funding: Default::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct L2Config {
    pub rest_url: String,
    pub poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for L2Config {
    fn default() -> Self {
        L2Config {
            rest_url: DEFAULT_L2_REST_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            receipt_timeout_secs: DEFAULT_RECEIPT_TIMEOUT_SECS,
        }
    }
}

/// A named demo participant. With neither `mnemonic` nor `private_key` a
/// random wallet is created and funded with `fund` ether.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorConfig {
    pub name: String,
    pub mnemonic: Option<String>,
    pub private_key: Option<String>,
    pub fund: Option<String>,
}

impl ActorConfig {
    pub fn named(name: &str) -> Self {
        ActorConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub eth_token: String,
    pub tokens: Vec<String>,
    /// Amounts in human readable units of each token.
    pub deposit_amount: String,
    pub withdraw_amount: String,
    pub sleep_ms: u64,
    pub batch_size: usize,
    // toml needs plain values ahead of tables
    pub alice: ActorConfig,
    pub bob: ActorConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            eth_token: "ETH".to_string(),
            tokens: vec!["DAI".to_string(), "wBTC".to_string()],
            deposit_amount: "1000".to_string(),
            withdraw_amount: "100".to_string(),
            sleep_ms: DEFAULT_SLEEP_MS,
            batch_size: DEFAULT_BATCH_SIZE,
            alice: ActorConfig {
                fund: Some("2000.0".to_string()),
                ..ActorConfig::named("Alice")
            },
            bob: ActorConfig {
                fund: Some("1.0".to_string()),
                ..ActorConfig::named("Bob")
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpConfig {
    pub compose_bin: String,
    pub services: Vec<String>,
}

impl Default for UpConfig {
    fn default() -> Self {
        UpConfig {
            compose_bin: "docker-compose".to_string(),
            services: DEFAULT_COMPOSE_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
