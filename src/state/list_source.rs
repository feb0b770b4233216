//! Paged remote list with loading status and optional account filter.
//!
//! A [`RemoteListSource`] owns a [`PageCursor`] and turns cursor moves into
//! list requests against a [`QuerySource`]. Requests may overlap (a manual
//! refresh racing a poll, say); each one takes a sequence number and a
//! response older than the last applied one is dropped, so the displayed
//! page is always the most recently requested one that completed.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::pagination::PageCursor;
use crate::client::QuerySource;
use crate::domain::{DashError, ListRequest, Page, QueryFilter, RemoteRecord};

// ============================================================================
// Status
// ============================================================================

/// Loading status of a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last applied request succeeded.
    Ready,
    /// The last applied request failed with this message.
    Failed(String),
}

/// Point-in-time view of a list for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot<R> {
    pub records: Vec<R>,
    pub status: ListStatus,
    pub page_index: usize,
    pub page: Page,
    /// A full page came back, so there may be more.
    pub has_next_page: bool,
}

#[derive(Debug)]
struct ListState<R> {
    cursor: PageCursor,
    account: Option<String>,
    records: Vec<R>,
    status: ListStatus,
    last_page: Option<Page>,
    applied_seq: u64,
}

// ============================================================================
// Remote List Source
// ============================================================================

/// A paged, filterable view over one remote collection.
#[derive(Debug)]
pub struct RemoteListSource<R: RemoteRecord> {
    source: Arc<dyn QuerySource>,
    base_filter: Option<QueryFilter>,
    state: Mutex<ListState<R>>,
    seq: AtomicU64,
    updates: watch::Sender<u64>,
    _record: PhantomData<fn() -> R>,
}

impl<R: RemoteRecord> RemoteListSource<R> {
    #[must_use]
    pub fn new(source: Arc<dyn QuerySource>, page_size: usize) -> Self {
        Self {
            source,
            base_filter: None,
            state: Mutex::new(ListState {
                cursor: PageCursor::new(page_size),
                account: None,
                records: Vec::new(),
                status: ListStatus::Idle,
                last_page: None,
                applied_seq: 0,
            }),
            seq: AtomicU64::new(0),
            updates: watch::channel(0).0,
            _record: PhantomData,
        }
    }

    /// Adds a fixed remote filter used when no account filter is set.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<QueryFilter>) -> Self {
        self.base_filter = filter;
        self
    }

    /// Restricts the list to one account and returns to page 0.
    ///
    /// Collections without address fields ignore the account.
    pub async fn set_account(&self, account: Option<String>) {
        let mut state = self.state.lock().await;
        state.account = account.filter(|a| !a.trim().is_empty());
        state.cursor.reset();
        state.last_page = None;
    }

    /// Changes the page size and returns to page 0.
    pub async fn set_page_size(&self, page_size: usize) {
        let mut state = self.state.lock().await;
        state.cursor.set_page_size(page_size);
        state.last_page = None;
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    /// Fetches one page and applies it unless a newer request already was.
    ///
    /// # Errors
    ///
    /// Returns the query or decode error of this request. The error is also
    /// recorded as [`ListStatus::Failed`] if the request was still current.
    pub async fn fetch(&self, page: Page) -> Result<Vec<R>, DashError> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let account = {
            let mut state = self.state.lock().await;
            state.status = ListStatus::Loading;
            state.last_page = Some(page);
            state.account.clone()
        };

        let remote_filter = account
            .as_deref()
            .and_then(R::account_filter)
            .or_else(|| self.base_filter.clone());
        let request = ListRequest::for_record::<R>(page).with_filter(remote_filter);

        let result = self
            .source
            .list(&request)
            .await
            .and_then(|raw| decode_records::<R>(raw, account.as_deref()));

        let mut state = self.state.lock().await;
        if seq < state.applied_seq {
            tracing::debug!(
                "Discarding stale {} response (seq {seq} < {})",
                R::COLLECTION,
                state.applied_seq
            );
            return result;
        }
        state.applied_seq = seq;

        match &result {
            Ok(records) => {
                state.records = records.clone();
                state.status = ListStatus::Ready;
            }
            Err(err) => {
                tracing::warn!("Failed to load {}: {err}", R::COLLECTION);
                state.status = ListStatus::Failed(err.to_string());
            }
        }
        self.updates.send_replace(seq);
        result
    }

    /// Fetches the page under the cursor.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn load(&self) -> Result<Vec<R>, DashError> {
        let page = self.state.lock().await.cursor.derive();
        self.fetch(page).await
    }

    /// Re-issues the last request with identical page parameters.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn refresh(&self) -> Result<Vec<R>, DashError> {
        let page = {
            let state = self.state.lock().await;
            state.last_page.unwrap_or_else(|| state.cursor.derive())
        };
        self.fetch(page).await
    }

    /// Advances one page and loads it.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn next_page(&self) -> Result<Vec<R>, DashError> {
        self.state.lock().await.cursor.next();
        self.load().await
    }

    /// Goes back one page (never before page 0) and loads it.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn prev_page(&self) -> Result<Vec<R>, DashError> {
        self.state.lock().await.cursor.prev();
        self.load().await
    }

    /// Jumps to page `n` and loads it.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn go_to(&self, n: i64) -> Result<Vec<R>, DashError> {
        self.state.lock().await.cursor.go_to(n);
        self.load().await
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    pub async fn snapshot(&self) -> ListSnapshot<R> {
        let state = self.state.lock().await;
        let page = state.cursor.derive();
        ListSnapshot {
            records: state.records.clone(),
            status: state.status.clone(),
            page_index: state.cursor.index(),
            page,
            has_next_page: state.records.len() == page.limit,
        }
    }

    /// Yields the sequence number of every applied response.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    // ------------------------------------------------------------------------
    // Polling
    // ------------------------------------------------------------------------

    /// Re-issues the last request every `interval` until the returned
    /// handle is stopped or dropped. The first poll happens one interval
    /// from now.
    #[must_use = "polling stops when the handle is dropped"]
    pub fn start_polling(self: &Arc<Self>, interval: Duration) -> PollHandle {
        let list = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::debug!("Polling {}", R::COLLECTION);
                // Failures are already recorded in the list status.
                let _ = list.refresh().await;
            }
        });
        PollHandle { task }
    }
}

/// Decodes raw records and applies the local account filter.
fn decode_records<R: RemoteRecord>(
    raw: Vec<Value>,
    account: Option<&str>,
) -> Result<Vec<R>, DashError> {
    let records = raw
        .into_iter()
        .map(serde_json::from_value::<R>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DashError::query(format!("malformed {} record: {e}", R::COLLECTION)))?;

    Ok(match account {
        Some(account) if R::account_filter(account).is_some() => records
            .into_iter()
            .filter(|record| record.matches_account(account))
            .collect(),
        _ => records,
    })
}

// ============================================================================
// Poll Handle
// ============================================================================

/// Owns a polling task; dropping it stops the polling.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {
        // Drop aborts the task.
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
