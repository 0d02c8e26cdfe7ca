//! Store wrappers for observing and breaking the data path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hiremetrics_persistence::assembly::AssembledQuery;
use hiremetrics_persistence::core::{AnalyticsStore, Row};
use hiremetrics_persistence::error::{BackendError, StorageResult};

/// Delegates to an inner store and counts statement executions.
pub struct CountingStore<S> {
    inner: S,
    calls: Arc<AtomicUsize>,
}

impl<S> CountingStore<S> {
    /// Wraps `inner`; the returned counter is shared with the wrapper.
    pub fn new(inner: S) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl<S: AnalyticsStore> AnalyticsStore for CountingStore<S> {
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    async fn fetch_rows(&self, query: &AssembledQuery) -> StorageResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_rows(query).await
    }

    async fn ping(&self) -> StorageResult<()> {
        self.inner.ping().await
    }
}

/// How a [`FailingStore`] fails.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// The database cannot be reached.
    Unreachable,
    /// The statement itself failed.
    Query,
}

/// A store whose every call fails.
pub struct FailingStore {
    pub failure: Failure,
}

impl FailingStore {
    fn error(&self) -> BackendError {
        match self.failure {
            Failure::Unreachable => BackendError::ConnectionFailed {
                backend_name: "failing".to_string(),
                message: "connection refused".to_string(),
            },
            Failure::Query => BackendError::QueryError {
                message: "no such table: job_dashboard_base".to_string(),
            },
        }
    }
}

#[async_trait]
impl AnalyticsStore for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_rows(&self, _query: &AssembledQuery) -> StorageResult<Vec<Row>> {
        Err(self.error().into())
    }

    async fn ping(&self) -> StorageResult<()> {
        Err(self.error().into())
    }
}
