//! Paged list requests against the indexing service.

use super::DashError;
use super::record::RemoteRecord;

// ============================================================================
// Page
// ============================================================================

/// Page parameters of a list query: `first` / `skip` in subgraph terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    /// Maximum number of records, always at least 1.
    pub limit: usize,
    /// Number of records skipped.
    pub offset: usize,
}

// ============================================================================
// Filters
// ============================================================================

/// Filter applied on the remote side of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// `field == value`.
    Eq {
        /// Field name.
        field: String,
        /// Expected value.
        value: String,
    },
    /// `min <= field <= max`.
    Range {
        /// Field name.
        field: String,
        /// Inclusive lower bound.
        min: String,
        /// Inclusive upper bound.
        max: String,
    },
    /// Any of the `(field, value)` equalities holds.
    AnyOf(Vec<(String, String)>),
}

impl QueryFilter {
    /// Equality filter.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Inclusive range filter.
    #[must_use]
    pub fn range(field: impl Into<String>, min: impl Into<String>, max: impl Into<String>) -> Self {
        Self::Range {
            field: field.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    /// Disjunction of equalities.
    #[must_use]
    pub fn any_of<F: Into<String>>(clauses: impl IntoIterator<Item = (F, String)>) -> Self {
        Self::AnyOf(
            clauses
                .into_iter()
                .map(|(field, value)| (field.into(), value))
                .collect(),
        )
    }

    /// Renders the filter as a GraphQL `where` input object literal.
    #[must_use]
    pub fn to_graphql(&self) -> String {
        match self {
            Self::Eq { field, value } => format!("{{ {field}: {} }}", quote(value)),
            Self::Range { field, min, max } => format!(
                "{{ {field}_gte: {}, {field}_lte: {} }}",
                quote(min),
                quote(max)
            ),
            Self::AnyOf(clauses) => {
                let parts: Vec<String> = clauses
                    .iter()
                    .map(|(field, value)| format!("{{ {field}: {} }}", quote(value)))
                    .collect();
                format!("{{ or: [{}] }}", parts.join(", "))
            }
        }
    }
}

/// Quotes a value as a GraphQL string literal.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

// ============================================================================
// List Request
// ============================================================================

/// Everything needed to issue one list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Collection name.
    pub collection: &'static str,
    /// Selection set.
    pub fields: &'static str,
    /// Page parameters.
    pub page: Page,
    /// Ordering field, if any. Lists are always newest first.
    pub order_by: Option<&'static str>,
    /// Remote filter, if any.
    pub filter: Option<QueryFilter>,
}

impl ListRequest {
    /// Newest-first request for a record type.
    #[must_use]
    pub fn for_record<R: RemoteRecord>(page: Page) -> Self {
        Self {
            collection: R::COLLECTION,
            fields: R::FIELDS,
            page,
            order_by: Some(R::ORDER_BY),
            filter: None,
        }
    }

    /// Adds a remote filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<QueryFilter>) -> Self {
        self.filter = filter;
        self
    }
}

// ============================================================================
// Instructor Lookups
// ============================================================================

/// The ways instructor records can be looked up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstructorLookup {
    /// Every record, newest first.
    #[default]
    All,
    /// By the id emitted on chain.
    ById(String),
    /// By exact age.
    ByAge(String),
    /// By inclusive age range.
    ByAgeRange {
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },
}

fn parse_age(raw: &str) -> Result<u64, DashError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DashError::invalid_input("age is required"));
    }
    raw.parse::<u64>()
        .map_err(|_| DashError::invalid_input(format!("'{raw}' is not a valid age")))
}

impl InstructorLookup {
    /// Validates the lookup and turns it into a remote filter.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Validation` for an empty id, a non-numeric age,
    /// or a range whose minimum exceeds its maximum.
    pub fn to_filter(&self) -> Result<Option<QueryFilter>, DashError> {
        match self {
            Self::All => Ok(None),
            Self::ById(id) => {
                let id = id.trim();
                if id.is_empty() {
                    return Err(DashError::invalid_input("instructor id is required"));
                }
                Ok(Some(QueryFilter::eq("instructorId", id)))
            }
            Self::ByAge(age) => {
                let age = parse_age(age)?;
                Ok(Some(QueryFilter::eq("age", age.to_string())))
            }
            Self::ByAgeRange { min, max } => {
                let (min, max) = (parse_age(min)?, parse_age(max)?);
                if min > max {
                    return Err(DashError::invalid_input(
                        "minimum age cannot be greater than maximum age",
                    ));
                }
                Ok(Some(QueryFilter::range("age", min.to_string(), max.to_string())))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
