//! Request/Response logging middleware

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderMap, Request, Response};
use http_body_util::BodyExt;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info};
use waystation_core::{Body, Middleware, Next, RemoteAddr, Result};
use waystation_web::ip_address;

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct RequestLoggerConfig {
    /// Log the body of successful responses under `body`
    pub log_response_body: bool,
}

/// One "Processed request" record
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseLog {
    /// Client address
    pub remote_addr: Option<String>,
    /// Request method
    pub method: String,
    /// Request path
    pub path: String,
    /// Raw query string
    pub query: Option<String>,
    /// Request `Content-Type`
    pub content_type: Option<String>,
    /// Request `User-Agent`
    pub http_agent: Option<String>,
    /// Request `Accept`
    pub http_accept: Option<String>,
    /// Host the request was addressed to
    pub server_name: Option<String>,
    /// Response status code
    pub status: u16,
    /// Time spent downstream, in seconds
    pub duration: f64,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body of a failed request
    pub error: Option<String>,
    /// Response body of a successful request, when enabled
    pub body: Option<String>,
}

/// Request facts captured before the request moves downstream
#[derive(Debug, Clone)]
struct RequestInfo {
    remote_addr: Option<String>,
    method: String,
    path: String,
    query: Option<String>,
    content_type: Option<String>,
    http_agent: Option<String>,
    http_accept: Option<String>,
    server_name: Option<String>,
}

impl RequestInfo {
    fn capture(req: &Request<Body>) -> Self {
        let headers = req.headers();
        Self {
            remote_addr: ip_address::extract(headers, req.extensions().get::<RemoteAddr>()),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_owned),
            content_type: header_text(headers, header::CONTENT_TYPE),
            http_agent: header_text(headers, header::USER_AGENT),
            http_accept: header_text(headers, header::ACCEPT),
            server_name: req
                .uri()
                .host()
                .map(str::to_owned)
                .or_else(|| {
                    header_text(headers, header::HOST)
                        .map(|host| host.split(':').next().unwrap_or_default().to_string())
                }),
        }
    }

    fn as_log_input(&self) -> RequestLogInput<'_> {
        RequestLogInput {
            remote_addr: self.remote_addr.as_deref(),
            method: &self.method,
            path: &self.path,
            query: self.query.as_deref(),
            content_type: self.content_type.as_deref(),
            http_agent: self.http_agent.as_deref(),
            http_accept: self.http_accept.as_deref(),
            server_name: self.server_name.as_deref(),
        }
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Build the log record for a finished request.
///
/// Bodies of 4xx/5xx responses always go to `error`; other bodies go to
/// `body` only when `log_response_body` is set.
pub fn response_log(
    info: &RequestLogInput<'_>,
    status: u16,
    headers: &HeaderMap,
    body: Option<&[u8]>,
    duration: Duration,
    log_response_body: bool,
) -> ResponseLog {
    let text = body.map(|bytes| String::from_utf8_lossy(bytes).into_owned());
    let (error, body) = if status >= 400 {
        (text, None)
    } else if log_response_body {
        (None, text)
    } else {
        (None, None)
    };

    ResponseLog {
        remote_addr: info.remote_addr.map(str::to_owned),
        method: info.method.to_string(),
        path: info.path.to_string(),
        query: info.query.map(str::to_owned),
        content_type: info.content_type.map(str::to_owned),
        http_agent: info.http_agent.map(str::to_owned),
        http_accept: info.http_accept.map(str::to_owned),
        server_name: info.server_name.map(str::to_owned),
        status,
        duration: duration.as_secs_f64(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("[invalid UTF-8]").to_string(),
                )
            })
            .collect(),
        error,
        body,
    }
}

/// Borrowed request facts for [`response_log`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogInput<'a> {
    /// Client address
    pub remote_addr: Option<&'a str>,
    /// Request method
    pub method: &'a str,
    /// Request path
    pub path: &'a str,
    /// Raw query string
    pub query: Option<&'a str>,
    /// Request `Content-Type`
    pub content_type: Option<&'a str>,
    /// Request `User-Agent`
    pub http_agent: Option<&'a str>,
    /// Request `Accept`
    pub http_accept: Option<&'a str>,
    /// Host the request was addressed to
    pub server_name: Option<&'a str>,
}

/// Request/Response logging middleware
///
/// Emits one structured "Processed request" event per request, at `error`
/// level for 5xx responses and `info` otherwise.
#[derive(Clone, Default)]
pub struct RequestLogger {
    config: RequestLoggerConfig,
}

impl RequestLogger {
    /// Create a new RequestLogger with default config
    pub fn new() -> Self {
        Self::with_config(RequestLoggerConfig::default())
    }

    /// Create a new RequestLogger with custom config
    pub fn with_config(config: RequestLoggerConfig) -> Self {
        Self { config }
    }

    fn needs_body(&self, status: u16) -> bool {
        status >= 400 || self.config.log_response_body
    }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger")
            .field("log_response_body", &self.config.log_response_body)
            .finish()
    }
}

fn emit(log: &ResponseLog) {
    let headers = format!("{:?}", log.headers);
    if log.status >= 500 {
        error!(
            remote_addr = log.remote_addr.as_deref(),
            method = %log.method,
            path = %log.path,
            query = log.query.as_deref(),
            content_type = log.content_type.as_deref(),
            http_agent = log.http_agent.as_deref(),
            http_accept = log.http_accept.as_deref(),
            server_name = log.server_name.as_deref(),
            status = log.status,
            duration = log.duration,
            headers = %headers,
            error = log.error.as_deref(),
            body = log.body.as_deref(),
            "Processed request"
        );
    } else {
        info!(
            remote_addr = log.remote_addr.as_deref(),
            method = %log.method,
            path = %log.path,
            query = log.query.as_deref(),
            content_type = log.content_type.as_deref(),
            http_agent = log.http_agent.as_deref(),
            http_accept = log.http_accept.as_deref(),
            server_name = log.server_name.as_deref(),
            status = log.status,
            duration = log.duration,
            headers = %headers,
            error = log.error.as_deref(),
            body = log.body.as_deref(),
            "Processed request"
        );
    }
}

#[async_trait]
impl Middleware for RequestLogger {
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let info = RequestInfo::capture(&req);
        let start = Instant::now();

        let response = match next.run(req).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    method = %info.method,
                    path = %info.path,
                    error = %e,
                    duration = start.elapsed().as_secs_f64(),
                    "Request failed"
                );
                return Err(e);
            }
        };
        let duration = start.elapsed();

        let status = response.status().as_u16();
        let (parts, body) = response.into_parts();
        let bytes: Bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        let logged = self.needs_body(status).then_some(&bytes[..]);

        let log = response_log(
            &info.as_log_input(),
            status,
            &parts.headers,
            logged,
            duration,
            self.config.log_response_body,
        );
        emit(&log);

        Ok(Response::from_parts(parts, Body::new(bytes)))
    }
}
