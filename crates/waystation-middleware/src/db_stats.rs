//! Per-request database query statistics
//!
//! [`DbStatsMiddleware`] opens a task-local scope for each request. Database
//! code reports finished queries with [`record_query`]; when the request is
//! done the collected runtime and query count are emitted as histograms.

use crate::sink::StatsSink;
use crate::stats::route_path;
use async_trait::async_trait;
use http::{Request, Response};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use waystation_core::{Body, MatchedRoute, Middleware, Next, Result};

/// Default metric prefix
pub const DEFAULT_DB_PREFIX: &str = "web.request.db";

tokio::task_local! {
    static QUERY_STATS: Arc<QueryStats>;
}

/// Snapshot of the queries run for one request
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuerySnapshot {
    /// Total query time in milliseconds
    pub runtime_ms: f64,
    /// Number of queries
    pub queries: u64,
}

/// Accumulator shared by everything running inside one request scope
#[derive(Debug, Default)]
pub struct QueryStats {
    inner: Mutex<QuerySnapshot>,
}

impl QueryStats {
    /// Add one query
    pub fn record(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.runtime_ms += duration.as_secs_f64() * 1000.0;
        inner.queries += 1;
    }

    /// Current totals
    pub fn snapshot(&self) -> QuerySnapshot {
        *self.inner.lock()
    }
}

/// Record a finished query against the current request.
///
/// Returns `false` when called outside a [`DbStatsMiddleware`] scope.
pub fn record_query(duration: Duration) -> bool {
    QUERY_STATS.try_with(|stats| stats.record(duration)).is_ok()
}

/// Emits `<prefix>.runtime` and `<prefix>.queries` histograms
#[derive(Clone)]
pub struct DbStatsCollector {
    sink: Arc<dyn StatsSink>,
    prefix: String,
}

impl DbStatsCollector {
    /// Collector reporting to `sink` under `prefix`
    pub fn new(sink: Arc<dyn StatsSink>, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
        }
    }

    /// Emit one snapshot
    pub fn emit(&self, snapshot: &QuerySnapshot, tags: &[String]) {
        self.sink
            .histogram(&format!("{}.runtime", self.prefix), snapshot.runtime_ms, tags);
        self.sink
            .histogram(&format!("{}.queries", self.prefix), snapshot.queries as f64, tags);
    }
}

impl fmt::Debug for DbStatsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbStatsCollector")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Middleware scoping query statistics to each request
#[derive(Debug, Clone)]
pub struct DbStatsMiddleware {
    collector: DbStatsCollector,
}

impl DbStatsMiddleware {
    /// Report to `sink` under `prefix`
    pub fn new(sink: Arc<dyn StatsSink>, prefix: impl Into<String>) -> Self {
        Self {
            collector: DbStatsCollector::new(sink, prefix),
        }
    }
}

#[async_trait]
impl Middleware for DbStatsMiddleware {
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let method = req.method().to_string();
        let request_route = req.extensions().get::<MatchedRoute>().cloned();
        let stats = Arc::new(QueryStats::default());

        let result = QUERY_STATS.scope(Arc::clone(&stats), next.run(req)).await;

        let response_route = result
            .as_ref()
            .ok()
            .and_then(|response| response.extensions().get::<MatchedRoute>());
        let path = route_path(response_route, request_route.as_ref());
        let tags = [format!("method:{method}"), format!("path:{path}")];
        self.collector.emit(&stats.snapshot(), &tags);

        result
    }
}
