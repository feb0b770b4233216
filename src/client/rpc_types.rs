//! Ethereum JSON-RPC payloads.
//!
//! Quantities arrive as `0x`-prefixed hex and are deserialized straight into
//! `U64` / `U256`.

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use serde::{Deserialize, Serialize};

/// Parameters of `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

/// Result of `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub input: Bytes,
}

impl RpcTransaction {
    /// Whether `account` sent or received this transaction, ignoring case.
    #[must_use]
    pub fn involves(&self, account: &str) -> bool {
        self.from.eq_ignore_ascii_case(account)
            || self
                .to
                .as_deref()
                .is_some_and(|to| to.eq_ignore_ascii_case(account))
    }
}

/// One log entry of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Result of `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: String,
    pub block_number: U64,
    pub gas_used: U256,
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
    /// `0x1` on success, `0x0` on revert; absent before Byzantium.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

impl RpcReceipt {
    /// Returns `false` only for an explicit revert status.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status.is_none_or(|status| status == U64::from(1))
    }
}

/// Header fields of `eth_getBlockByNumber`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcBlock {
    pub number: U64,
    #[serde(default)]
    pub hash: Option<String>,
    pub timestamp: U64,
}

/// `eth_getBlockByNumber` with full transaction objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcFullBlock {
    pub number: U64,
    #[serde(default)]
    pub hash: Option<String>,
    pub timestamp: U64,
    pub gas_used: U256,
    pub gas_limit: U256,
    #[serde(default)]
    pub miner: Option<String>,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}
