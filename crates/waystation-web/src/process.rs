//! Handler result to HTTP response
//!
//! Successful results are written as they are; failures go through the
//! [`ErrorMapper`] first.

use crate::error_mapper::ErrorMapper;
use crate::responses::Response;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use std::sync::Arc;
use tracing::debug;
use waystation_core::{AppError, Body, Result};

/// Outcome of a request handler
pub type HandlerResult = std::result::Result<Response, AppError>;

/// Writes handler results to the wire
#[derive(Debug, Clone, Default)]
pub struct Web {
    mapper: Arc<ErrorMapper>,
}

impl Web {
    /// Pipeline using `mapper` for failures
    pub fn new(mapper: ErrorMapper) -> Self {
        Self {
            mapper: Arc::new(mapper),
        }
    }

    /// Error mapper in use
    pub fn mapper(&self) -> &ErrorMapper {
        &self.mapper
    }

    /// Resolve a handler result into a response model value
    pub fn resolve(&self, result: HandlerResult) -> Result<Response> {
        match result {
            Ok(response) => Ok(response),
            Err(err) => {
                debug!(error = %err, "Mapping handler failure");
                self.mapper.map(err)
            }
        }
    }

    /// Resolve and serialize a handler result into an HTTP response
    pub fn process(&self, result: HandlerResult) -> Result<http::Response<Body>> {
        let response = self.resolve(result)?;
        let body = serde_json::to_vec(&response.body())?;

        let mut builder = http::Response::builder().status(response.status());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
            headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("application/json"));
        }

        Ok(builder.body(Body::new(Bytes::from(body)))?)
    }
}
