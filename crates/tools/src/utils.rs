use std::{ffi::OsStr, process::Command, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use mr_config::Config;
use mr_rpc_client::{EthRpcClient, L1Ops, L2Ops, RestClient, RollupClient};

pub fn run<I, S>(bin: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S> + std::fmt::Debug,
    S: AsRef<OsStr>,
{
    log::debug!("[Execute]: {} {:?}", bin, args);
    let status = Command::new(bin)
        .env("RUST_BACKTRACE", "full")
        .args(args)
        .status()
        .with_context(|| format!("run command {}", bin))?;
    if !status.success() {
        Err(anyhow!("Exited with status code: {:?}", status.code()))
    } else {
        Ok(())
    }
}

/// Connect both layers described by `config`.
pub async fn connect(config: &Config) -> Result<(Arc<dyn L1Ops>, Arc<dyn L2Ops>)> {
    let poll_interval = Duration::from_millis(config.l2.poll_interval_ms);
    let receipt_timeout = Duration::from_secs(config.l2.receipt_timeout_secs);

    let l1: Arc<dyn L1Ops> = Arc::new(
        EthRpcClient::new(&config.l1.rpc_url)?
            .with_gas_limit(config.l1.gas_limit)
            .with_polling(poll_interval, receipt_timeout),
    );
    let rest = Arc::new(RestClient::new(&config.l2.rest_url)?);
    let rollup = RollupClient::connect(rest, Arc::clone(&l1))
        .await
        .with_context(|| format!("connect rollup at {}", config.l2.rest_url))?
        .with_polling(poll_interval, receipt_timeout);
    let l2: Arc<dyn L2Ops> = Arc::new(rollup);
    Ok((l1, l2))
}
