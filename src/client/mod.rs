//! Clients for the services the dashboard talks to.
//!
//! This module provides:
//! - [`SubgraphClient`] - paged GraphQL queries against the indexing service
//! - [`WalletProvider`] - the wallet request/subscribe capability
//! - [`JsonRpcProvider`] - a provider backed by a plain JSON-RPC node
//! - [`Signer`] - transaction submission for one connected account
//! - [`ChainReader`] - full blocks and contract views straight from the node

pub mod chain;
pub mod http;
pub mod provider;
pub mod rpc;
pub mod rpc_types;
pub mod signer;
pub mod subgraph;

// ============================================================================
// Re-exports
// ============================================================================

pub use chain::ChainReader;
pub use http::{HttpClient, HttpConfig};
pub use provider::{ProviderError, ProviderEvent, WalletProvider};
pub use rpc::JsonRpcProvider;
pub use rpc_types::{RpcFullBlock, RpcLog, RpcReceipt, RpcTransaction, TransactionRequest};
pub use signer::Signer;
pub use subgraph::{QuerySource, SubgraphClient};
