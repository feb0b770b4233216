//! JSON-RPC 2.0 provider over HTTP.
//!
//! Plain nodes know nothing about wallet permission or chain management, so
//! [`JsonRpcProvider`] emulates the wallet side: `wallet_addEthereumChain`
//! registers an RPC endpoint per chain, `wallet_switchEthereumChain` moves
//! subsequent requests to a registered endpoint and reports 4902 for an
//! unknown chain. A watcher task turns changes in `eth_accounts` /
//! `eth_chainId` into provider events.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use super::http::HttpClient;
use super::provider::{
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, ProviderError, ProviderEvent,
    WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN, WalletProvider,
};
use crate::domain::{chain_id_hex, parse_chain_id};

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Endpoint table: the active URL plus every registered chain.
#[derive(Debug)]
struct Endpoints {
    active: String,
    registered: HashMap<u64, String>,
}

// ============================================================================
// Provider
// ============================================================================

/// Wallet provider backed by a JSON-RPC node.
#[derive(Debug)]
pub struct JsonRpcProvider {
    http: HttpClient,
    endpoints: Mutex<Endpoints>,
    next_id: AtomicU64,
    events: broadcast::Sender<ProviderEvent>,
}

impl JsonRpcProvider {
    /// Creates a provider talking to `rpc_url` over an existing HTTP client.
    #[must_use]
    pub fn with_http(http: HttpClient, rpc_url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http,
            endpoints: Mutex::new(Endpoints {
                active: rpc_url.into(),
                registered: HashMap::new(),
            }),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// Pre-registers an endpoint for a chain, as if
    /// `wallet_addEthereumChain` had been called.
    pub async fn register_chain(&self, chain_id: u64, rpc_url: impl Into<String>) {
        self.endpoints
            .lock()
            .await
            .registered
            .insert(chain_id, rpc_url.into());
    }

    /// URL requests are currently sent to.
    pub async fn active_url(&self) -> String {
        self.endpoints.lock().await.active.clone()
    }

    /// Sends one JSON-RPC call to the active endpoint.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let url = self.active_url().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!("RPC {method} (id {id}) -> {url}");

        let response = self
            .http
            .post_json(&url, &body)
            .send()
            .await
            .inspect_err(|e| tracing::debug!("RPC {method} transport error: {e}"))
            .map_err(|e| ProviderError::new(ProviderError::DISCONNECTED, e.to_string()))?;

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(ProviderError::DISCONNECTED, e.to_string()))?;

        match envelope {
            RpcResponse {
                error: Some(err), ..
            } => Err(ProviderError::new(err.code, err.message)),
            RpcResponse { result, .. } => Ok(result.unwrap_or(Value::Null)),
        }
    }

    async fn request_accounts(&self, params: Value) -> Result<Value, ProviderError> {
        match self.call(ETH_REQUEST_ACCOUNTS, params).await {
            Err(err) if err.code == ProviderError::METHOD_NOT_FOUND => {
                tracing::debug!("Node has no {ETH_REQUEST_ACCOUNTS}, using {ETH_ACCOUNTS}");
                self.call(ETH_ACCOUNTS, json!([])).await
            }
            other => other,
        }
    }

    async fn add_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let chain_id = chain_id_param(params)?;
        let rpc_url = params[0]["rpcUrls"][0].as_str().ok_or_else(|| {
            ProviderError::new(ProviderError::INVALID_PARAMS, "rpcUrls must not be empty")
        })?;

        tracing::info!("Registered chain {chain_id} at {rpc_url}");
        self.register_chain(chain_id, rpc_url).await;
        Ok(Value::Null)
    }

    async fn switch_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let chain_id = chain_id_param(params)?;

        {
            let mut endpoints = self.endpoints.lock().await;
            let Some(url) = endpoints.registered.get(&chain_id).cloned() else {
                return Err(ProviderError::new(
                    ProviderError::UNRECOGNIZED_CHAIN,
                    format!(
                        "Unrecognized chain ID {}. Try adding the chain first.",
                        chain_id_hex(chain_id)
                    ),
                ));
            };
            endpoints.active = url;
        }

        tracing::info!("Switched provider to chain {chain_id}");
        // No subscriber is fine; the watcher may not be running.
        let _ = self
            .events
            .send(ProviderEvent::ChainChanged(chain_id_hex(chain_id)));
        Ok(Value::Null)
    }

    /// Spawns a task that polls the node and broadcasts account and chain
    /// changes. The first observation only sets the baseline.
    pub fn spawn_watcher(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_accounts: Option<Vec<String>> = None;
            let mut last_chain: Option<String> = None;

            loop {
                ticker.tick().await;

                if let Ok(value) = provider.call(ETH_ACCOUNTS, json!([])).await {
                    let accounts: Vec<String> =
                        serde_json::from_value(value).unwrap_or_default();
                    if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                        let _ = provider
                            .events
                            .send(ProviderEvent::AccountsChanged(accounts.clone()));
                    }
                    last_accounts = Some(accounts);
                }

                if let Ok(Value::String(chain)) = provider.call(ETH_CHAIN_ID, json!([])).await {
                    if last_chain.as_ref().is_some_and(|prev| *prev != chain) {
                        let _ = provider.events.send(ProviderEvent::ChainChanged(chain.clone()));
                    }
                    last_chain = Some(chain);
                }
            }
        })
    }
}

/// Extracts `params[0].chainId`.
fn chain_id_param(params: &Value) -> Result<u64, ProviderError> {
    params[0]["chainId"]
        .as_str()
        .and_then(|raw| parse_chain_id(raw).ok())
        .ok_or_else(|| ProviderError::new(ProviderError::INVALID_PARAMS, "missing or bad chainId"))
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match method {
            ETH_REQUEST_ACCOUNTS => self.request_accounts(params).await,
            WALLET_ADD_CHAIN => self.add_chain(&params).await,
            WALLET_SWITCH_CHAIN => self.switch_chain(&params).await,
            _ => self.call(method, params).await,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
