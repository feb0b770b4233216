//! Application configuration.
//!
//! This module provides the [`AppConfig`] structure holding endpoints, page
//! sizes, and polling cadence. The file is only ever read; every field has
//! a default, so a partial or missing file is fine.
//!
//! # Configuration File Location
//!
//! The configuration file is read from:
//! - Linux: `~/.config/ethdash/config.json`
//! - macOS: `~/Library/Application Support/ethdash/config.json`
//! - Windows: `%APPDATA%/ethdash/config.json`
//!
//! # Example
//!
//! ```ignore
//! use crate::state::AppConfig;
//!
//! // Load existing config or use defaults
//! let config = AppConfig::load();
//! let blocks = RemoteListSource::<Block>::new(source, config.block_page_size);
//! ```

use alloy_primitives::Address;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::http::DEFAULT_TIMEOUT_SECS;
use crate::constants::{
    BLOCK_PAGE_SIZE, CONFIRMATION_POLL_INTERVAL, DEFAULT_INSTRUCTOR_SUBGRAPH_URL,
    DEFAULT_SUBGRAPH_URL, POLL_INTERVAL_SECS, TRANSACTION_PAGE_SIZE,
};
use crate::domain::{DEFAULT_CHAIN_ID, INFO_CONTRACT_ADDRESS, network_info};

// ============================================================================
// Constants
// ============================================================================

/// Application name used for configuration directory.
const APP_NAME: &str = "ethdash";

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Public Sepolia endpoint, used if the registry lookup ever fails.
const FALLBACK_RPC_URL: &str = "https://ethereum-sepolia.publicnode.com";

// ============================================================================
// AppConfig
// ============================================================================

/// Application configuration.
///
/// Missing fields take their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Subgraph serving blocks, transactions, and account stats.
    pub subgraph_url: String,
    /// Subgraph serving instructor records.
    pub instructor_subgraph_url: String,
    /// JSON-RPC endpoint backing the wallet provider.
    pub rpc_url: String,
    /// Chain assumed before a wallet reports one.
    pub default_chain_id: u64,
    /// Deployment of the instructor contract.
    pub info_contract: Address,
    /// Blocks per page.
    pub block_page_size: usize,
    /// Transactions per page.
    pub transaction_page_size: usize,
    /// Seconds between list re-fetches in watch mode.
    pub poll_interval_secs: u64,
    /// Timeout for every subgraph and RPC request.
    pub request_timeout_secs: u64,
    /// Seconds between receipt polls while a write confirms.
    pub confirmation_poll_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            subgraph_url: DEFAULT_SUBGRAPH_URL.to_string(),
            instructor_subgraph_url: DEFAULT_INSTRUCTOR_SUBGRAPH_URL.to_string(),
            rpc_url: network_info(DEFAULT_CHAIN_ID)
                .map_or(FALLBACK_RPC_URL, |n| n.rpc_url)
                .to_string(),
            default_chain_id: DEFAULT_CHAIN_ID,
            info_contract: INFO_CONTRACT_ADDRESS,
            block_page_size: BLOCK_PAGE_SIZE,
            transaction_page_size: TRANSACTION_PAGE_SIZE,
            poll_interval_secs: POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            confirmation_poll_secs: CONFIRMATION_POLL_INTERVAL.as_secs(),
        }
    }
}

impl AppConfig {
    /// Returns the path to the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Could not determine config directory. Expected XDG_CONFIG_HOME or ~/.config on Linux, ~/Library/Application Support on macOS, %APPDATA% on Windows"
            )
        })?;
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Loads the configuration from disk.
    ///
    /// A missing file silently yields the defaults; an unreadable or invalid
    /// one yields the defaults with a warning.
    #[must_use]
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) if !path.exists() => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            _ => match Self::try_load() {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("Config load failed, using defaults: {err}");
                    Self::default()
                }
            },
        }
    }

    /// Attempts to load the configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration path cannot be determined
    /// - The file cannot be read
    /// - The JSON content cannot be parsed
    pub fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    /// Parses configuration JSON, clamping page sizes to at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON content cannot be parsed.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(content)?;
        config.block_page_size = config.block_page_size.max(1);
        config.transaction_page_size = config.transaction_page_size.max(1);
        Ok(config)
    }

    /// Interval between list re-fetches; never shorter than one second.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Per-request HTTP timeout; never shorter than one second.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Interval between receipt polls; never shorter than one second.
    #[must_use]
    pub fn confirmation_interval(&self) -> Duration {
        Duration::from_secs(self.confirmation_poll_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_chain_id, 11_155_111);
        assert_eq!(config.block_page_size, 15);
        assert_eq!(config.transaction_page_size, 20);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.rpc_url, "https://ethereum-sepolia.publicnode.com");
        assert_eq!(config.info_contract, INFO_CONTRACT_ADDRESS);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.confirmation_interval(), CONFIRMATION_POLL_INTERVAL);
    }

    #[test]
    fn test_empty_object_is_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config =
            AppConfig::from_json(r#"{"subgraph_url":"http://localhost:8000/subgraphs/name/x"}"#)
                .unwrap();
        assert_eq!(config.subgraph_url, "http://localhost:8000/subgraphs/name/x");
        assert_eq!(config.instructor_subgraph_url, DEFAULT_INSTRUCTOR_SUBGRAPH_URL);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = AppConfig {
            default_chain_id: 1,
            poll_interval_secs: 5,
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[rstest]
    #[case::zero_blocks(r#"{"block_page_size":0}"#)]
    #[case::zero_transactions(r#"{"transaction_page_size":0}"#)]
    fn test_page_sizes_are_clamped(#[case] json: &str) {
        let config = AppConfig::from_json(json).unwrap();
        assert!(config.block_page_size >= 1);
        assert!(config.transaction_page_size >= 1);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let config = AppConfig::from_json(
            r#"{"poll_interval_secs":0,"request_timeout_secs":0,"confirmation_poll_secs":0}"#,
        )
        .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.confirmation_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(AppConfig::from_json("not json").is_err());
        assert!(AppConfig::from_json(r#"{"info_contract":"0x12"}"#).is_err());
    }

    #[test]
    fn test_config_path_has_json_extension() {
        if let Ok(path) = AppConfig::config_path() {
            let extension = path.extension().and_then(|e| e.to_str());
            assert_eq!(extension, Some("json"));
            assert!(path.to_string_lossy().contains(APP_NAME));
        }
    }
}
