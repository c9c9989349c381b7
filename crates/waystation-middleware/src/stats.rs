//! Request timing middleware

use crate::sink::StatsSink;
use async_trait::async_trait;
use http::{header, HeaderMap, Request, Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;
use waystation_core::{Body, MatchedRoute, Middleware, Next, Result, StatsTags};

/// Default distribution name
pub const DEFAULT_REQUEST_METRIC: &str = "web.request";

const UNKNOWN_ROUTE: &str = "unknown-route";

static GLIA_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+\.)?glia\.com$").expect("Invalid glia domain regex pattern"));

/// Route path for tagging: the response's [`MatchedRoute`], then the
/// request's, else `unknown-route`.
pub(crate) fn route_path(response: Option<&MatchedRoute>, request: Option<&MatchedRoute>) -> String {
    response
        .or(request)
        .map(|route| route.path().to_string())
        .unwrap_or_else(|| UNKNOWN_ROUTE.to_string())
}

fn extract_domain(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    Url::parse(value).ok()?.host_str().map(str::to_owned)
}

/// `glia` when `Origin` (or, without it, `Referer`) points at glia.com or a
/// subdomain, `other` otherwise.
pub fn origin_tag(headers: &HeaderMap) -> &'static str {
    let header_value = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
    let domain = extract_domain(header_value(header::ORIGIN))
        .or_else(|| extract_domain(header_value(header::REFERER)));

    match domain {
        Some(domain) if GLIA_DOMAIN.is_match(&domain) => "glia",
        _ => "other",
    }
}

/// Milliseconds with three decimals
pub(crate) fn duration_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1_000_000.0).round() / 1_000.0
}

/// Reports one timing distribution per request.
///
/// Tags: `path`, `method`, `status`, `status_class`, `origin`, followed by any
/// [`StatsTags`] the handler attached to the response.
#[derive(Clone)]
pub struct StatsMiddleware {
    sink: Arc<dyn StatsSink>,
    metric: String,
}

impl StatsMiddleware {
    /// Report to `sink` under `metric`
    pub fn new(sink: Arc<dyn StatsSink>, metric: impl Into<String>) -> Self {
        Self {
            sink,
            metric: metric.into(),
        }
    }
}

impl fmt::Debug for StatsMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsMiddleware")
            .field("metric", &self.metric)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for StatsMiddleware {
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let start = Instant::now();
        let method = req.method().to_string();
        let request_route = req.extensions().get::<MatchedRoute>().cloned();
        let origin = origin_tag(req.headers());

        let response = next.run(req).await?;

        let status = response.status().as_u16();
        let path = route_path(response.extensions().get(), request_route.as_ref());
        let mut tags = vec![
            format!("path:{path}"),
            format!("method:{method}"),
            format!("status:{status}"),
            format!("status_class:{}xx", status / 100),
            format!("origin:{origin}"),
        ];
        if let Some(StatsTags(extra)) = response.extensions().get::<StatsTags>() {
            tags.extend(extra.iter().cloned());
        }

        self.sink
            .distribution(&self.metric, duration_ms(start.elapsed()), &tags);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MockStatsSink;
    use http::{HeaderValue, StatusCode};
    use mockall::predicate::{always, eq};
    use waystation_core::{handler_fn, Chain};

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_origin_tag() {
        assert_eq!(origin_tag(&headers(&[(header::ORIGIN, "https://glia.com")])), "glia");
        assert_eq!(
            origin_tag(&headers(&[(header::ORIGIN, "https://app.GLIA.com/path")])),
            "glia"
        );
        assert_eq!(
            origin_tag(&headers(&[(header::ORIGIN, "https://glia.com.evil.com")])),
            "other"
        );
        assert_eq!(
            origin_tag(&headers(&[(header::ORIGIN, "https://notglia.com")])),
            "other"
        );
        assert_eq!(origin_tag(&HeaderMap::new()), "other");
        assert_eq!(origin_tag(&headers(&[(header::ORIGIN, "not a url")])), "other");
    }

    #[test]
    fn test_origin_falls_back_to_referer() {
        assert_eq!(
            origin_tag(&headers(&[(header::REFERER, "https://x.glia.com/page")])),
            "glia"
        );
        assert_eq!(
            origin_tag(&headers(&[
                (header::ORIGIN, ""),
                (header::REFERER, "https://glia.com")
            ])),
            "glia"
        );
    }

    #[test]
    fn test_duration_ms_precision() {
        assert_eq!(duration_ms(Duration::from_nanos(1_234_567)), 1.235);
        assert_eq!(duration_ms(Duration::from_secs(2)), 2000.0);
    }

    #[test]
    fn test_route_path() {
        let request = MatchedRoute("GET /users/:id".to_string());
        let response = MatchedRoute("POST /users".to_string());

        assert_eq!(route_path(Some(&response), Some(&request)), "/users");
        assert_eq!(route_path(None, Some(&request)), "/users/:id");
        assert_eq!(route_path(None, None), "unknown-route");
    }

    #[tokio::test]
    async fn test_emits_distribution_with_tags() {
        let mut sink = MockStatsSink::new();
        sink.expect_distribution()
            .with(
                eq("web.request"),
                always(),
                eq(vec![
                    "path:/users/:id".to_string(),
                    "method:GET".to_string(),
                    "status:404".to_string(),
                    "status_class:4xx".to_string(),
                    "origin:glia".to_string(),
                    "feature:beta".to_string(),
                ]),
            )
            .times(1)
            .return_const(());

        let chain = Chain::new(
            vec![Arc::new(StatsMiddleware::new(Arc::new(sink), "web.request"))],
            handler_fn(|_req| async {
                let mut response = Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Body::from("{}"))?;
                response
                    .extensions_mut()
                    .insert(StatsTags(vec!["feature:beta".to_string()]));
                Ok(response)
            }),
        );

        let mut req = Request::builder()
            .method("GET")
            .uri("/users/42")
            .header(header::ORIGIN, "https://app.glia.com")
            .body(Body::from(""))
            .unwrap();
        req.extensions_mut()
            .insert(MatchedRoute("GET /users/:id".to_string()));

        let response = chain.handle(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
