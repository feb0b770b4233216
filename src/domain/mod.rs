//! Domain types for the ethdash Ethereum dashboard.
//!
//! This module contains the core types used throughout the application:
//! records served by the subgraph, list queries, display formatting, the
//! network registry, and the instructor contract bindings.
//!
//! # Module Organization
//!
//! - [`error`] - Error taxonomy for dashboard operations
//! - [`network`] - Supported EVM networks
//! - [`record`] - Blocks, transactions, account stats, instructors
//! - [`query`] - Paged list requests and filters
//! - [`format`] - Display formatting for raw fields
//! - [`contract`] - `setInfo` / `InstructorCreated` bindings and registry views

// ============================================================================
// Module Declarations
// ============================================================================

pub mod contract;
pub mod error;
pub mod format;
pub mod network;
pub mod query;
pub mod record;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::DashError;

// Network types
pub use network::{
    DEFAULT_CHAIN_ID, NetworkInfo, chain_id_hex, network_info, parse_chain_id, supported_networks,
};

// Record types
pub use record::{AccountStats, Block, Instructor, RemoteRecord, Transaction};

// Query types
pub use query::{InstructorLookup, ListRequest, Page, QueryFilter};

// Contract bindings
pub use contract::{
    INFO_CONTRACT_ADDRESS, InstructorEvent, InstructorProfile, decode_instructor_events,
    encode_set_info,
};
