use thiserror::Error;

// NOTE: Error only for [client].request(), not for decoding the result
#[derive(Error, Debug)]
#[error("{client} error, method: {method} error: {source}")]
pub struct RPCRequestError {
    pub client: &'static str,
    pub method: String,
    pub source: anyhow::Error,
}

impl RPCRequestError {
    pub fn new<E: Into<anyhow::Error>>(client: &'static str, method: String, source: E) -> Self {
        RPCRequestError {
            client,
            method,
            source: source.into(),
        }
    }
}

/// Error envelope returned by the rollup REST api.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rest api error, endpoint: {endpoint} error: {message} (code {code})")]
pub struct RestError {
    pub endpoint: String,
    pub code: u64,
    pub message: String,
}
