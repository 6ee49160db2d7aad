use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mr_types::{
    bytes::JsonBytes, receipt::EthReceipt, request::TransactionRequest, Address, H256, U256, U64,
};
use mr_utils::{eth_tx::LegacyTransaction, wallet::EthWallet};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    error::RPCRequestError,
    traits::L1Ops,
    utils::{poll_until, DEFAULT_HTTP_TIMEOUT},
};

/// Ethereum JSON-RPC client; transactions are signed locally.
pub struct EthRpcClient {
    url: reqwest::Url,
    client: reqwest::Client,
    id: AtomicU64,
    gas_limit: Option<u64>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl EthRpcClient {
    pub fn new(url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|err| anyhow!("invalid l1 rpc url {}: {}", url, err))?;
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;
        Ok(EthRpcClient {
            url,
            client,
            id: AtomicU64::new(0),
            gas_limit: None,
            poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(300),
        })
    }

    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_polling(mut self, poll_interval: Duration, receipt_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.receipt_timeout = receipt_timeout;
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn rpc<SuccessResponse: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<SuccessResponse> {
        let output = self
            .raw_rpc(method, params)
            .await
            .map_err(|err| RPCRequestError::new("eth client", method.to_string(), err))?;
        match output {
            jsonrpc_core::response::Output::Success(success) => {
                serde_json::from_value(success.result).map_err(Into::into)
            }
            jsonrpc_core::response::Output::Failure(failure) => Err(RPCRequestError::new(
                "eth client",
                method.to_string(),
                failure.error,
            )
            .into()),
        }
    }

    async fn raw_rpc(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<jsonrpc_core::response::Output> {
        let id = self.id.fetch_add(1, Ordering::SeqCst) + 1;
        let req_json = json!({
            "id": id,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let resp = self
            .client
            .post(self.url.clone())
            .json(&req_json)
            .send()
            .await?;
        let output = resp.json::<jsonrpc_core::response::Output>().await?;
        Ok(output)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let chain_id: U64 = self.rpc("eth_chainId", json!([])).await?;
        Ok(chain_id.as_u64())
    }

    pub async fn gas_price(&self) -> Result<U256> {
        self.rpc("eth_gasPrice", json!([])).await
    }

    pub async fn get_transaction_count(&self, address: Address) -> Result<U256> {
        self.rpc("eth_getTransactionCount", json!([address, "pending"]))
            .await
    }

    pub async fn estimate_gas(&self, from: Address, tx: &TransactionRequest) -> Result<U256> {
        let call = json!({
            "from": from,
            "to": tx.to,
            "value": tx.value,
            "data": JsonBytes::from_vec(tx.data.clone()),
        });
        self.rpc("eth_estimateGas", json!([call])).await
    }

    pub async fn get_transaction_receipt(&self, tx_hash: H256) -> Result<Option<EthReceipt>> {
        self.rpc("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }
}

#[async_trait]
impl L1Ops for EthRpcClient {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.rpc("eth_getBalance", json!([address, "latest"])).await
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let call = json!({
            "to": to,
            "data": JsonBytes::from_vec(data),
        });
        let output: JsonBytes = self.rpc("eth_call", json!([call, "latest"])).await?;
        Ok(output.into_vec())
    }

    async fn send_transaction(&self, wallet: &EthWallet, tx: TransactionRequest) -> Result<H256> {
        let from = wallet.address();
        let nonce = match tx.nonce {
            Some(nonce) => nonce,
            None => self.get_transaction_count(from).await?,
        };
        let gas_price = match tx.gas_price {
            Some(gas_price) => gas_price,
            None => self.gas_price().await?,
        };
        let gas_limit = match (tx.gas_limit, self.gas_limit) {
            (Some(gas_limit), _) => gas_limit,
            (None, Some(gas_limit)) => gas_limit.into(),
            (None, None) => self.estimate_gas(from, &tx).await?,
        };
        let chain_id = self.chain_id().await?;

        let legacy_tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: tx.to,
            value: tx.value,
            data: tx.data,
            chain_id,
        };
        let raw_tx = wallet.sign_transaction(&legacy_tx)?;
        let tx_hash: H256 = self
            .rpc(
                "eth_sendRawTransaction",
                json!([JsonBytes::from_vec(raw_tx)]),
            )
            .await?;
        log::debug!("sent l1 tx {:?} from {:?} nonce {}", tx_hash, from, nonce);
        Ok(tx_hash)
    }

    async fn wait_for_transaction(&self, tx_hash: H256) -> Result<EthReceipt> {
        poll_until(
            &format!("l1 tx {:?}", tx_hash),
            self.poll_interval,
            self.receipt_timeout,
            || self.get_transaction_receipt(tx_hash),
        )
        .await
    }
}
