//! Error types for dashboard operations.
//!
//! Every failure that can reach the user is one of the categories below.
//! Validation errors are raised before any network call; the others carry a
//! human-readable message that is shown once, with no automatic retry.

use color_eyre::Section;
use thiserror::Error;

use crate::client::ProviderError;

// ============================================================================
// Error Types
// ============================================================================

/// Custom error type for dashboard operations.
#[derive(Debug, Error)]
pub enum DashError {
    /// Wallet provider absent, unreachable, or the request was rejected.
    #[error("Wallet error: {0}")]
    Connectivity(String),

    /// Missing or malformed user input, caught before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Malformed response or upstream failure from the indexing service.
    #[error("Query failed: {0}")]
    Query(String),

    /// The signer rejected the transaction, or it reverted on chain.
    #[error("Transaction failed: {0}")]
    Submission(String),

    /// Receipt logs did not contain the expected event.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Network-related errors from HTTP requests.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing or data structure errors.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },
}

impl DashError {
    /// Create a new parse error with the given message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new validation error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new remote query error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a new submission error.
    #[must_use]
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission(message.into())
    }

    /// Create a new connectivity error.
    #[must_use]
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity(message.into())
    }

    /// Returns `true` for errors caught locally before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Convert to a `color_eyre::Report` for the binary edge. Validation
    /// errors carry a pointer to the usage text.
    #[must_use = "this converts the error into a Report for display"]
    pub fn into_report(self) -> color_eyre::Report {
        let validation = self.is_validation();
        let report = color_eyre::eyre::eyre!("{}", self);
        if validation {
            report.suggestion("Run the command with --help to see the expected arguments")
        } else {
            report
        }
    }
}

impl From<ProviderError> for DashError {
    fn from(err: ProviderError) -> Self {
        Self::Connectivity(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
