//! Middleware chain builder
//!
//! Middlewares run in the order they are added, outermost first.

use crate::*;
use std::sync::Arc;
use waystation_config::Config;
use waystation_core::{Chain, HandlerFn};

/// Middleware chain builder
#[derive(Debug, Default)]
pub struct MiddlewareBuilder {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareBuilder {
    /// Create a new middleware builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Standard stack for `config`: request logging, request stats,
    /// database stats, then connection release when a releaser is given
    pub fn from_config(
        config: &Config,
        sink: Arc<dyn StatsSink>,
        releaser: Option<Arc<dyn ConnectionReleaser>>,
    ) -> Self {
        let mut builder = Self::new().with_logging_config(RequestLoggerConfig {
            log_response_body: config.logging.log_response_body,
        });

        if config.stats.enabled {
            builder = builder
                .with_stats(Arc::clone(&sink), config.stats.request_metric.clone())
                .with_db_stats(sink, config.stats.db_prefix.clone());
        }

        match releaser {
            Some(releaser) if config.database.release_connections => {
                builder.with_connection_management(releaser)
            }
            _ => builder,
        }
    }

    /// Add request logging
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.middlewares.push(Arc::new(RequestLogger::new()));
        self
    }

    /// Add request logging with custom configuration
    #[must_use]
    pub fn with_logging_config(mut self, config: RequestLoggerConfig) -> Self {
        self.middlewares
            .push(Arc::new(RequestLogger::with_config(config)));
        self
    }

    /// Add request timing stats under `metric`
    #[must_use]
    pub fn with_stats(mut self, sink: Arc<dyn StatsSink>, metric: impl Into<String>) -> Self {
        self.middlewares
            .push(Arc::new(StatsMiddleware::new(sink, metric)));
        self
    }

    /// Add per-request database stats under `prefix`
    #[must_use]
    pub fn with_db_stats(mut self, sink: Arc<dyn StatsSink>, prefix: impl Into<String>) -> Self {
        self.middlewares
            .push(Arc::new(DbStatsMiddleware::new(sink, prefix)));
        self
    }

    /// Release database connections after each request
    #[must_use]
    pub fn with_connection_management(mut self, releaser: Arc<dyn ConnectionReleaser>) -> Self {
        self.middlewares
            .push(Arc::new(ConnectionManagement::new(releaser)));
        self
    }

    /// Add custom middleware
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Build the middleware stack
    #[must_use]
    pub fn build(self) -> Arc<[Arc<dyn Middleware>]> {
        self.middlewares.into()
    }

    /// Wrap `handler` in the middleware stack
    #[must_use]
    pub fn build_chain(self, handler: HandlerFn) -> Chain {
        Chain::new(self.middlewares, handler)
    }

    /// Get the number of middlewares
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the builder is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}
