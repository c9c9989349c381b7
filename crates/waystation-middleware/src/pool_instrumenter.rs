//! Periodic connection pool gauges

use crate::sink::StatsSink;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use waystation_config::DatabaseConfig;

/// Default gauge prefix
pub const DEFAULT_POOL_PREFIX: &str = "db.connection_pool";

/// Default reporting interval
pub const DEFAULT_POOL_INTERVAL: Duration = Duration::from_secs(1);

/// Connection pool exposing its current statistics, e.g. `size`, `busy`,
/// `idle`, `waiting`
pub trait PoolStats: Send + Sync {
    /// Statistic name and value pairs
    fn stat(&self) -> Vec<(String, f64)>;
}

/// Reports every pool statistic as a `<prefix>.<stat>` gauge
#[derive(Clone)]
pub struct ConnectionPoolInstrumenter {
    pool: Arc<dyn PoolStats>,
    sink: Arc<dyn StatsSink>,
    prefix: String,
    interval: Duration,
}

impl ConnectionPoolInstrumenter {
    /// Instrument `pool` with the default prefix
    pub fn new(pool: Arc<dyn PoolStats>, sink: Arc<dyn StatsSink>) -> Self {
        Self::with_prefix(pool, sink, DEFAULT_POOL_PREFIX)
    }

    /// Instrument `pool` under `prefix`
    pub fn with_prefix(
        pool: Arc<dyn PoolStats>,
        sink: Arc<dyn StatsSink>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            sink,
            prefix: prefix.into(),
            interval: DEFAULT_POOL_INTERVAL,
        }
    }

    /// Instrument `pool` with the prefix and interval from `config`
    pub fn from_config(
        config: &DatabaseConfig,
        pool: Arc<dyn PoolStats>,
        sink: Arc<dyn StatsSink>,
    ) -> Self {
        Self {
            interval: config.pool_interval,
            ..Self::with_prefix(pool, sink, config.pool_prefix.clone())
        }
    }

    /// Reporting interval used by [`spawn`](Self::spawn)
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// [`start`](Self::start) with the configured interval
    pub fn spawn(self) -> JoinHandle<()> {
        let interval = self.interval;
        self.start(interval)
    }

    /// Emit one round of gauges
    pub fn instrument(&self) {
        for (stat, value) in self.pool.stat() {
            self.sink
                .gauge(&format!("{}.{}", self.prefix, stat), value, &[]);
        }
    }

    /// Emit gauges every `interval` on a background task until the handle is
    /// aborted
    pub fn start(self, interval: Duration) -> JoinHandle<()> {
        debug!(prefix = %self.prefix, ?interval, "Starting connection pool instrumenter");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.instrument();
            }
        })
    }
}

impl fmt::Debug for ConnectionPoolInstrumenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPoolInstrumenter")
            .field("prefix", &self.prefix)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
