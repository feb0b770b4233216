//! Application constants for ethdash.
//!
//! Centralized defaults for paging, polling, and confirmation waits. Values
//! here are the fallbacks used when the configuration file does not set
//! them.

use std::time::Duration;

// ============================================================================
// Paging
// ============================================================================

/// Blocks shown per page.
pub const BLOCK_PAGE_SIZE: usize = 15;

/// Transactions shown per page.
pub const TRANSACTION_PAGE_SIZE: usize = 20;

/// Instructor records fetched per lookup.
pub const INSTRUCTOR_PAGE_SIZE: usize = 20;

// ============================================================================
// Timing
// ============================================================================

/// Seconds between automatic re-fetches of a mounted list.
pub const POLL_INTERVAL_SECS: u64 = 30;

/// Interval between receipt polls while waiting for a confirmation.
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Interval between account/chain polls of the JSON-RPC watcher.
pub const PROVIDER_WATCH_INTERVAL: Duration = Duration::from_secs(4);

// ============================================================================
// Endpoints
// ============================================================================

/// Subgraph indexing blocks, transactions, and accounts.
pub const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.studio.thegraph.com/query/119297/chengzf/v0.0.1";

/// Subgraph indexing `InstructorCreated` events.
pub const DEFAULT_INSTRUCTOR_SUBGRAPH_URL: &str =
    "https://api.studio.thegraph.com/query/119297/info-contract-subgraph/version/latest";
