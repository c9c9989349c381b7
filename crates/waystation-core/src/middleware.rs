//! Middleware trait and chain

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Body type alias
pub type Body = Full<Bytes>;

/// Boxed future returned by handlers
pub type BoxFuture = Pin<Box<dyn Future<Output = Result<Response<Body>>> + Send>>;

/// Middleware trait for request/response processing
#[async_trait]
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Process a request
    ///
    /// # Arguments
    ///
    /// * `req` - The incoming HTTP request
    /// * `next` - The next middleware/handler in the chain
    ///
    /// # Returns
    ///
    /// Returns the HTTP response or an error
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>>;
}

/// Type alias for the final handler function
pub type HandlerFn = Arc<dyn Fn(Request<Body>) -> BoxFuture + Send + Sync>;

/// Wrap an async function as the final handler of a chain
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<Body>>> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)) as BoxFuture)
}

/// Represents the next middleware/handler in the chain
pub struct Next {
    middleware_stack: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    final_handler: Option<HandlerFn>,
}

impl Next {
    /// Create a new Next from a middleware stack
    pub fn new(middleware_stack: Arc<[Arc<dyn Middleware>]>) -> Self {
        Self {
            middleware_stack,
            index: 0,
            final_handler: None,
        }
    }

    /// Create a new Next with a final handler
    pub fn with_handler(middleware_stack: Arc<[Arc<dyn Middleware>]>, handler: HandlerFn) -> Self {
        Self {
            middleware_stack,
            index: 0,
            final_handler: Some(handler),
        }
    }

    /// Run the next middleware or final handler
    pub async fn run(self, req: Request<Body>) -> Result<Response<Body>> {
        if let Some(middleware) = self.middleware_stack.get(self.index) {
            let next = Self {
                middleware_stack: Arc::clone(&self.middleware_stack),
                index: self.index + 1,
                final_handler: self.final_handler.clone(),
            };
            middleware.call(req, next).await
        } else if let Some(handler) = self.final_handler {
            handler(req).await
        } else {
            Err(Error::Internal(
                "Middleware chain completed without handler".to_string(),
            ))
        }
    }
}

impl Clone for Next {
    fn clone(&self) -> Self {
        Self {
            middleware_stack: Arc::clone(&self.middleware_stack),
            index: self.index,
            final_handler: self.final_handler.clone(),
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &(self.middleware_stack.len() - self.index))
            .field("has_handler", &self.final_handler.is_some())
            .finish()
    }
}

/// A middleware stack wrapped around a final handler
#[derive(Clone)]
pub struct Chain {
    middleware_stack: Arc<[Arc<dyn Middleware>]>,
    handler: HandlerFn,
}

impl Chain {
    /// Build a chain; middlewares run in the given order, outermost first
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>, handler: HandlerFn) -> Self {
        Self {
            middleware_stack: middlewares.into(),
            handler,
        }
    }

    /// Send one request through the chain
    pub async fn handle(&self, req: Request<Body>) -> Result<Response<Body>> {
        Next::with_handler(Arc::clone(&self.middleware_stack), Arc::clone(&self.handler))
            .run(req)
            .await
    }

    /// Number of middlewares in front of the handler
    pub fn len(&self) -> usize {
        self.middleware_stack.len()
    }

    /// Whether the handler is called directly
    pub fn is_empty(&self) -> bool {
        self.middleware_stack.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("middlewares", &self.middleware_stack)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for Recording {
        async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
            self.log.lock().push(format!("{} before", self.name));
            let response = next.run(req).await;
            self.log.lock().push(format!("{} after", self.name));
            response
        }
    }

    fn ok_handler() -> HandlerFn {
        handler_fn(|_req| async {
            Ok(Response::builder()
                .status(StatusCode::OK)
                .body(Body::from("ok"))?)
        })
    }

    #[tokio::test]
    async fn test_chain_runs_outermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(
            vec![
                Arc::new(Recording {
                    name: "outer",
                    log: Arc::clone(&log),
                }),
                Arc::new(Recording {
                    name: "inner",
                    log: Arc::clone(&log),
                }),
            ],
            ok_handler(),
        );

        let req = Request::builder().uri("/test").body(Body::from("")).unwrap();
        let response = chain.handle(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock(),
            vec!["outer before", "inner before", "inner after", "outer after"]
        );
    }

    #[tokio::test]
    async fn test_chain_without_handler_errors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stack: Arc<[Arc<dyn Middleware>]> = Arc::new([Arc::new(Recording {
            name: "only",
            log,
        }) as Arc<dyn Middleware>]);

        let req = Request::builder().uri("/test").body(Body::from("test")).unwrap();
        let result = Next::new(stack).run(req).await;

        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
