//! Shared HTTP plumbing for the subgraph and JSON-RPC clients.

use reqwest::Client;
use std::time::Duration;

use crate::domain::DashError;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 4;

/// How long an idle pooled connection is kept
const POOL_IDLE_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Configuration
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HttpConfig {
    /// Create config with custom timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Pooled JSON-over-HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DashError::Connectivity` if the HTTP client fails to
    /// initialize (e.g., TLS backend unavailable).
    pub fn with_config(config: HttpConfig) -> Result<Self, DashError> {
        let inner = Client::builder()
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| DashError::connectivity(format!("HTTP client init failed: {e}")))?;

        Ok(Self { inner })
    }

    /// Build a JSON POST request with standard headers
    pub fn post_json(&self, url: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.inner
            .post(url)
            .header("accept", "application/json")
            .json(body)
    }
}
