use ethereum_types::{Address, H256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::{bytes::JsonBytes, tx::TxHash};

pub type SerialId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Queued,
    Committed,
    Finalized,
    Rejected,
}

/// Receipt of an L2 transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub status: TxStatus,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub fail_reason: Option<String>,
}

impl TxReceipt {
    pub fn success(&self) -> bool {
        !matches!(self.status, TxStatus::Rejected)
    }

    pub fn is_executed(&self) -> bool {
        matches!(self.status, TxStatus::Committed | TxStatus::Finalized)
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.status, TxStatus::Finalized)
    }
}

/// Receipt of an L1 priority operation (deposit, full exit).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOpReceipt {
    pub serial_id: SerialId,
    pub status: TxStatus,
    #[serde(default)]
    pub block_number: Option<u64>,
}

impl PriorityOpReceipt {
    pub fn executed(&self) -> bool {
        matches!(self.status, TxStatus::Committed | TxStatus::Finalized)
    }
}

/// L1 transaction that emitted a priority request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorityOpHandle {
    pub eth_tx_hash: H256,
    pub serial_id: SerialId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthLog {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: JsonBytes,
}

/// Receipt of an L1 transaction, as returned by `eth_getTransactionReceipt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthReceipt {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<EthLog>,
}

impl EthReceipt {
    pub fn success(&self) -> bool {
        self.status.map(|s| s == U64::one()).unwrap_or(false)
    }

    /// Gas cost paid by the sender, zero when the node omits the price.
    pub fn fee(&self) -> U256 {
        self.gas_used.unwrap_or_default() * self.effective_gas_price.unwrap_or_default()
    }
}
