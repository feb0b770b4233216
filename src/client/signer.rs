//! Provider-derived signing capability for one account.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U64;
use serde_json::json;

use super::provider::{
    ETH_GET_BLOCK, ETH_GET_RECEIPT, ETH_GET_TRANSACTION, ETH_SEND_TRANSACTION, ProviderError,
    WalletProvider, request_as,
};
use super::rpc_types::{RpcBlock, RpcReceipt, RpcTransaction, TransactionRequest};
use crate::domain::DashError;

/// Submits transactions on behalf of one connected account.
#[derive(Clone)]
pub struct Signer {
    provider: Arc<dyn WalletProvider>,
    account: String,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl Signer {
    #[must_use]
    pub fn new(provider: Arc<dyn WalletProvider>, account: impl Into<String>) -> Self {
        Self {
            provider,
            account: account.into(),
        }
    }

    /// Address transactions are sent from.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Sends a transaction and returns its hash.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the wallet rejects the request.
    pub async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<String, ProviderError> {
        let params = serde_json::to_value(request)
            .map(|tx| json!([tx]))
            .map_err(|e| ProviderError::new(ProviderError::INVALID_PARAMS, e.to_string()))?;

        let result = self.provider.request(ETH_SEND_TRANSACTION, params).await?;
        result.as_str().map(str::to_string).ok_or_else(|| {
            ProviderError::new(
                ProviderError::INVALID_PARAMS,
                format!("{ETH_SEND_TRANSACTION} returned no hash"),
            )
        })
    }

    /// Receipt of a transaction, or `None` while still pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or the receipt is malformed.
    pub async fn receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, DashError> {
        request_as(self.provider.as_ref(), ETH_GET_RECEIPT, json!([hash])).await
    }

    /// Transaction details by hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or the payload is malformed.
    pub async fn transaction(&self, hash: &str) -> Result<Option<RpcTransaction>, DashError> {
        request_as(self.provider.as_ref(), ETH_GET_TRANSACTION, json!([hash])).await
    }

    /// Block header by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or the payload is malformed.
    pub async fn block(&self, number: U64) -> Result<Option<RpcBlock>, DashError> {
        request_as(
            self.provider.as_ref(),
            ETH_GET_BLOCK,
            json!([number, false]),
        )
        .await
    }

    /// Polls until the transaction has a receipt (one confirmation).
    ///
    /// # Errors
    ///
    /// Returns an error if any receipt poll fails.
    pub async fn wait_for_receipt(
        &self,
        hash: &str,
        poll_interval: Duration,
    ) -> Result<RpcReceipt, DashError> {
        loop {
            if let Some(receipt) = self.receipt(hash).await? {
                return Ok(receipt);
            }
            tracing::debug!("Transaction {hash} still pending");
            tokio::time::sleep(poll_interval).await;
        }
    }
}
