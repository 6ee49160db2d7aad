use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mr_types::{
    account::{AccountFullInfo, AccountInfo, AccountRef, BlockKind, Nft},
    fee::{Fee, FeeRequest},
    receipt::{PriorityOpReceipt, SerialId, TxReceipt},
    token::{Token, TokenId},
    tx::{SubmitTxRequest, TxHash},
    Address,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{RPCRequestError, RestError},
    traits::RollupApi,
    utils::DEFAULT_HTTP_TIMEOUT,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    code: u64,
    message: String,
}

/// Every REST response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
struct Response<T> {
    status: ResponseStatus,
    result: Option<T>,
    error: Option<ApiError>,
}

/// Network parameters published by the `config` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub network: String,
    pub contract: Address,
    pub gov_contract: Option<Address>,
    pub deposit_confirmations: u64,
}

/// Client of the rollup REST api.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestClient {
    pub fn new(url: &str) -> Result<Self> {
        reqwest::Url::parse(url).map_err(|err| anyhow!("invalid rest url {}: {}", url, err))?;
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;
        Ok(RestClient {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let request = self.client.get(self.endpoint(path));
        self.request(path, request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.client.post(self.endpoint(path)).json(body);
        self.request(path, request)
            .await?
            .ok_or_else(|| anyhow!("empty result from {}", path))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let resp = request
            .send()
            .await
            .map_err(|err| RPCRequestError::new("rest client", path.to_string(), err))?;
        let resp: Response<T> = resp
            .json()
            .await
            .map_err(|err| RPCRequestError::new("rest client", path.to_string(), err))?;
        match resp.status {
            ResponseStatus::Success => Ok(resp.result),
            ResponseStatus::Error => {
                let (code, message) = resp
                    .error
                    .map(|err| (err.code, err.message))
                    .unwrap_or((0, "unknown error".to_string()));
                Err(RestError {
                    endpoint: path.to_string(),
                    code,
                    message,
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl RollupApi for RestClient {
    async fn config(&self) -> Result<ApiConfig> {
        self.get("config")
            .await?
            .ok_or_else(|| anyhow!("rollup config is empty"))
    }

    async fn tokens(&self) -> Result<Vec<Token>> {
        Ok(self.get("tokens").await?.unwrap_or_default())
    }

    async fn account_info(
        &self,
        account: AccountRef,
        kind: BlockKind,
    ) -> Result<Option<AccountInfo>> {
        self.get(&format!("accounts/{}/{}", account, kind)).await
    }

    async fn account_full_info(&self, account: AccountRef) -> Result<AccountFullInfo> {
        let info = self.get(&format!("accounts/{}", account)).await?;
        Ok(info.unwrap_or(AccountFullInfo {
            committed: None,
            finalized: None,
        }))
    }

    async fn fee(&self, req: &FeeRequest) -> Result<Fee> {
        self.post("fee", req).await
    }

    async fn submit_tx(&self, req: &SubmitTxRequest) -> Result<TxHash> {
        self.post("transactions", req).await
    }

    async fn tx_receipt(&self, tx_hash: &TxHash) -> Result<Option<TxReceipt>> {
        self.get(&format!("transactions/{}", tx_hash)).await
    }

    async fn priority_op_receipt(
        &self,
        serial_id: SerialId,
    ) -> Result<Option<PriorityOpReceipt>> {
        self.get(&format!("operations/{}", serial_id)).await
    }

    async fn nft(&self, id: TokenId) -> Result<Option<Nft>> {
        self.get(&format!("tokens/nft/{}", id)).await
    }
}
