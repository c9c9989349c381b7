//! Database connection release after each request

use async_trait::async_trait;
use http::{Request, Response};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use waystation_core::{Body, Middleware, Next, Result, TestRequest};

/// Returns connections checked out by the current request to their pool
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionReleaser: Send + Sync {
    /// Release every active connection
    fn release(&self);
}

/// Releases database connections once the downstream call finishes, whether
/// it succeeded or failed. Requests carrying [`TestRequest`] are left alone.
#[derive(Clone)]
pub struct ConnectionManagement {
    releaser: Arc<dyn ConnectionReleaser>,
}

impl ConnectionManagement {
    /// Release through `releaser`
    pub fn new(releaser: Arc<dyn ConnectionReleaser>) -> Self {
        Self { releaser }
    }
}

impl fmt::Debug for ConnectionManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManagement").finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for ConnectionManagement {
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let testing = req.extensions().get::<TestRequest>().is_some();

        let result = next.run(req).await;

        if !testing {
            self.releaser.release();
            debug!(failed = result.is_err(), "Released database connections");
        }
        result
    }
}
