//! The wallet provider capability.
//!
//! A provider answers `request(method, params)` calls and pushes
//! `accountsChanged` / `chainChanged` notifications to subscribers. The
//! wallet session and the signer only ever talk to a provider through the
//! [`WalletProvider`] trait, so tests can script one in memory.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::DashError;

// ============================================================================
// Method Names
// ============================================================================

pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const WALLET_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const WALLET_ADD_CHAIN: &str = "wallet_addEthereumChain";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const ETH_GET_RECEIPT: &str = "eth_getTransactionReceipt";
pub const ETH_GET_TRANSACTION: &str = "eth_getTransactionByHash";
pub const ETH_GET_BLOCK: &str = "eth_getBlockByNumber";
pub const ETH_CALL: &str = "eth_call";

// ============================================================================
// Errors and Events
// ============================================================================

/// Error object returned by a provider (EIP-1193 shape).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The provider is disconnected from every chain.
    pub const DISCONNECTED: i64 = 4900;
    /// The requested chain has not been added to the provider.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// JSON-RPC method not found.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// JSON-RPC invalid params.
    pub const INVALID_PARAMS: i64 = -32602;

    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_unrecognized_chain(&self) -> bool {
        self.code == Self::UNRECOGNIZED_CHAIN
    }

    #[must_use]
    pub const fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }
}

/// Notification pushed by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed account list changed; empty means locked or revoked.
    AccountsChanged(Vec<String>),
    /// The active chain changed; carries the hex chain id.
    ChainChanged(String),
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Request/subscribe access to a wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync + Debug {
    /// Issues one RPC request.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Subscribes to account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Issues a request and deserializes the result.
///
/// # Errors
///
/// Provider failures become `DashError::Connectivity`; a result of the wrong
/// shape becomes `DashError::Parse`.
pub async fn request_as<T: DeserializeOwned>(
    provider: &dyn WalletProvider,
    method: &str,
    params: Value,
) -> Result<T, DashError> {
    let value = provider.request(method, params).await?;
    serde_json::from_value(value)
        .map_err(|e| DashError::parse(format!("unexpected {method} result: {e}")))
}
