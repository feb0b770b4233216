//! Stateful components of the dashboard.
//!
//! - [`pagination::PageCursor`] - page index and size for a paged list
//! - [`RemoteListSource`] - one paged, filterable remote collection
//! - [`WalletSession`] - wallet connection state machine
//! - [`TransactionSubmitter`] - writes and their confirmed records
//! - [`AppConfig`] - read-only configuration
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │     RemoteListSource     │      │       WalletSession      │
//! │  PageCursor → QuerySource│      │  commands ─┐  ┌─ events │
//! │  seq-numbered responses  │      │            ▼  ▼          │
//! └──────────────────────────┘      │   single task → watch    │
//!                                   └────────────┬─────────────┘
//!                                                │ signer
//!                                   ┌────────────▼─────────────┐
//!                                   │   TransactionSubmitter   │
//!                                   └──────────────────────────┘
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod list_source;
pub mod pagination;
pub mod submitter;
pub mod wallet;


// ============================================================================
// Re-exports
// ============================================================================

// Configuration types
pub use config::AppConfig;

// List types
pub use list_source::{ListSnapshot, ListStatus, RemoteListSource};

// Wallet types
pub use wallet::{WalletCommand, WalletSession, WalletSessionState, WalletStatus};

// Submission types
pub use submitter::{
    SubmissionEvent, SubmissionKind, SubmittedTransaction, TransactionSubmitter, TransferForm,
};
