//! GraphQL client for the indexing subgraph.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::http::HttpClient;
use crate::domain::{AccountStats, DashError, ListRequest};

// ============================================================================
// Query Source Trait
// ============================================================================

/// Anything that can answer a paged list request with raw records.
#[async_trait]
pub trait QuerySource: Send + Sync + Debug {
    /// Returns the records of one page, newest first.
    async fn list(&self, request: &ListRequest) -> Result<Vec<Value>, DashError>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

// ============================================================================
// Query Rendering
// ============================================================================

/// Renders the GraphQL document for a list request.
///
/// Page parameters are passed as `$first` / `$skip` variables; ordering and
/// filter are inlined.
#[must_use]
pub fn render_list_query(request: &ListRequest) -> String {
    let mut args = vec!["first: $first".to_string(), "skip: $skip".to_string()];
    if let Some(order_by) = request.order_by {
        args.push(format!("orderBy: {order_by}"));
        args.push("orderDirection: desc".to_string());
    }
    if let Some(filter) = &request.filter {
        args.push(format!("where: {}", filter.to_graphql()));
    }

    format!(
        "query List($first: Int!, $skip: Int!) {{ {}({}) {{ {} }} }}",
        request.collection,
        args.join(", "),
        request.fields
    )
}

/// Variables accompanying [`render_list_query`].
#[must_use]
pub fn list_variables(request: &ListRequest) -> Value {
    json!({
        "first": request.page.limit,
        "skip": request.page.offset,
    })
}

/// Extracts `data` from a GraphQL envelope, turning `errors` into a query
/// error.
fn into_data(response: GraphQlResponse) -> Result<Value, DashError> {
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(DashError::query(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| DashError::query("response carried neither data nor errors"))
}

// ============================================================================
// Subgraph Client
// ============================================================================

/// Client for one subgraph endpoint.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: HttpClient,
    endpoint: String,
}

impl SubgraphClient {
    /// Creates a client for `endpoint` sharing an existing HTTP client.
    #[must_use]
    pub fn with_http(http: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Posts one GraphQL document and returns its `data` object.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Network` on transport failure and
    /// `DashError::Query` on a non-success status or GraphQL errors.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value, DashError> {
        let body = json!({ "query": query, "variables": variables });

        let response = self
            .http
            .post_json(&self.endpoint, &body)
            .send()
            .await
            .inspect_err(|e| tracing::debug!("Subgraph request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DashError::query(format!("HTTP {status}: {text}")));
        }

        let envelope: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| DashError::parse(format!("invalid GraphQL response: {e}")))?;
        into_data(envelope)
    }

    /// Fetches aggregated statistics for one account, if indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the entity is malformed.
    pub async fn account_stats(&self, account: &str) -> Result<Option<AccountStats>, DashError> {
        let query = format!(
            "query Account($id: ID!) {{ account(id: $id) {{ {} }} }}",
            AccountStats::FIELDS
        );
        let data = self
            .execute(&query, json!({ "id": account.to_lowercase() }))
            .await?;

        match data.get("account") {
            None | Some(Value::Null) => Ok(None),
            Some(entity) => serde_json::from_value(entity.clone())
                .map(Some)
                .map_err(|e| DashError::parse(format!("invalid account entity: {e}"))),
        }
    }
}

#[async_trait]
impl QuerySource for SubgraphClient {
    async fn list(&self, request: &ListRequest) -> Result<Vec<Value>, DashError> {
        tracing::debug!(
            "Listing {} (first {}, skip {})",
            request.collection,
            request.page.limit,
            request.page.offset
        );

        let data = self
            .execute(&render_list_query(request), list_variables(request))
            .await?;

        match data.get(request.collection) {
            Some(Value::Array(records)) => Ok(records.clone()),
            _ => Err(DashError::query(format!(
                "response missing '{}'",
                request.collection
            ))),
        }
    }
}
