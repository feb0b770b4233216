//! Records served by the indexing service.
//!
//! Records are immutable once fetched and are identified by an `id` unique
//! within their collection. Big integers and hex data arrive as strings and
//! are only turned into display strings by [`crate::domain::format`].

use std::fmt::Debug;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;

use super::query::QueryFilter;

// ============================================================================
// RemoteRecord Trait
// ============================================================================

/// A record type that can be listed page by page from the subgraph.
pub trait RemoteRecord: DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Collection name in the subgraph schema.
    const COLLECTION: &'static str;

    /// GraphQL selection set for one record.
    const FIELDS: &'static str;

    /// Field used for newest-first ordering.
    const ORDER_BY: &'static str;

    /// Address-valued fields the account filter compares against.
    fn address_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Remote filter restricting the collection to one account, if the
    /// collection has address fields at all.
    fn account_filter(_account: &str) -> Option<QueryFilter> {
        None
    }

    /// Returns whether any address field equals `account`, ignoring case.
    fn matches_account(&self, account: &str) -> bool {
        let needle = account.to_lowercase();
        self.address_fields()
            .into_iter()
            .any(|field| field.to_lowercase() == needle)
    }
}

/// Accepts counts encoded either as JSON numbers or as decimal strings.
fn count_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn optional_count_from_any<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "count_from_any")] u64);

    Option::<Wrapper>::deserialize(deserializer).map(|w| w.map(|Wrapper(n)| n))
}

// ============================================================================
// Blocks
// ============================================================================

/// An indexed block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Subgraph entity id.
    pub id: String,
    /// Block number, decimal string.
    pub number: String,
    /// Unix seconds, decimal string.
    pub timestamp: String,
    /// Block hash.
    pub hash: String,
    /// Gas used, decimal string.
    pub gas_used: String,
    /// Gas limit, decimal string.
    pub gas_limit: String,
    /// Number of transactions in the block.
    #[serde(deserialize_with = "count_from_any")]
    pub transaction_count: u64,
}

impl RemoteRecord for Block {
    const COLLECTION: &'static str = "blocks";
    const FIELDS: &'static str = "id number timestamp hash gasUsed gasLimit transactionCount";
    const ORDER_BY: &'static str = "timestamp";
}

// ============================================================================
// Transactions
// ============================================================================

/// Reference to an account entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountRef {
    /// Lowercased address.
    pub id: String,
}

/// Reference to a block entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockRef {
    /// Subgraph entity id.
    pub id: String,
    /// Block number, decimal string.
    pub number: String,
}

/// An indexed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Subgraph entity id.
    pub id: String,
    /// Transaction hash.
    pub hash: String,
    /// Sender account.
    pub from: AccountRef,
    /// Recipient account; absent for contract creation.
    pub to: Option<AccountRef>,
    /// Value in wei, decimal string.
    pub value: String,
    /// Gas price in wei, decimal string.
    pub gas_price: String,
    /// Gas used, decimal string.
    pub gas_used: String,
    /// Unix seconds, decimal string.
    pub timestamp: String,
    /// Containing block.
    pub block: BlockRef,
}

impl Transaction {
    /// Recipient address, or an empty string for contract creation.
    #[must_use]
    pub fn to_address(&self) -> &str {
        self.to.as_ref().map_or("", |to| to.id.as_str())
    }
}

impl RemoteRecord for Transaction {
    const COLLECTION: &'static str = "transactions";
    const FIELDS: &'static str =
        "id hash from { id } to { id } value gasPrice gasUsed timestamp block { id number }";
    const ORDER_BY: &'static str = "timestamp";

    fn address_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.from.id.as_str()];
        if let Some(to) = &self.to {
            fields.push(to.id.as_str());
        }
        fields
    }

    fn account_filter(account: &str) -> Option<QueryFilter> {
        let account = account.to_lowercase();
        Some(QueryFilter::any_of([
            ("from", account.clone()),
            ("to", account),
        ]))
    }
}

// ============================================================================
// Account Statistics
// ============================================================================

/// Aggregated statistics for one account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    /// Lowercased address.
    pub id: String,
    /// Number of transactions touching the account.
    #[serde(default, deserialize_with = "optional_count_from_any")]
    pub transaction_count: Option<u64>,
    /// Total wei sent, decimal string.
    #[serde(default)]
    pub total_value_sent: Option<String>,
    /// Total wei received, decimal string.
    #[serde(default)]
    pub total_value_received: Option<String>,
}

impl AccountStats {
    /// GraphQL selection set for the single-entity query.
    pub const FIELDS: &'static str = "id transactionCount totalValueSent totalValueReceived";
}

// ============================================================================
// Instructors
// ============================================================================

/// A record indexed from the contract's `InstructorCreated` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    /// Subgraph entity id.
    pub id: String,
    /// On-chain id emitted by the event.
    pub instructor_id: String,
    /// Instructor name.
    pub name: String,
    /// Age, decimal string.
    pub age: String,
    /// Block number, decimal string.
    pub block_number: String,
    /// Unix seconds, decimal string.
    pub block_timestamp: String,
    /// Hash of the emitting transaction.
    pub transaction_hash: String,
}

impl RemoteRecord for Instructor {
    const COLLECTION: &'static str = "instructors";
    const FIELDS: &'static str =
        "id instructorId name age blockNumber blockTimestamp transactionHash";
    const ORDER_BY: &'static str = "blockTimestamp";
}

// ============================================================================
// Tests
// ============================================================================
