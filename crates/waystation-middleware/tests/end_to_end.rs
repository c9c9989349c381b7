//! Requests through the full middleware stack into a Waystation handler

use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use waystation_core::{
    handler_fn, verify_input, App, AppError, Body, Chain, Input, MatchedRoute,
    SchemaOutcome, TestRequest,
};
use waystation_middleware::{record_query, ConnectionReleaser, MiddlewareBuilder, StatsSink};
use waystation_web::{
    to_created, ContentTypeHeader, HandlerResult, HeadersExtractor, InputExtractor,
    InputValidator, ParamExtractor, RawRequest, Web,
};

#[derive(Debug)]
struct Directory {
    taken: Vec<&'static str>,
}

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingSink {
    fn names(&self) -> Vec<String> {
        self.records.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    fn tags_for(&self, name: &str) -> Option<Vec<String>> {
        self.records
            .lock()
            .iter()
            .find(|(recorded, _)| recorded == name)
            .map(|(_, tags)| tags.clone())
    }
}

impl StatsSink for RecordingSink {
    fn distribution(&self, name: &str, _value: f64, tags: &[String]) {
        self.records.lock().push((name.to_string(), tags.to_vec()));
    }

    fn histogram(&self, name: &str, _value: f64, tags: &[String]) {
        self.records.lock().push((name.to_string(), tags.to_vec()));
    }

    fn gauge(&self, _name: &str, _value: f64, _tags: &[String]) {}
}

#[derive(Default)]
struct CountingReleaser {
    releases: AtomicUsize,
}

impl ConnectionReleaser for CountingReleaser {
    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn object(value: Value) -> Input {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("test value must be an object"),
    }
}

fn user_schema(input: &Input) -> SchemaOutcome {
    match input.get("name").and_then(Value::as_str) {
        Some(_) => SchemaOutcome::valid(input.clone()),
        None => SchemaOutcome {
            output: Input::new(),
            errors: object(json!({"name": ["is missing"]})),
            hints: object(json!({"name": ["must be a string"]})),
        },
    }
}

fn create_user(app: &App<Directory>, raw: &RawRequest) -> HandlerResult {
    let extractor = ParamExtractor::body(["name", "role"])
        .merge(HeadersExtractor::new([("Content-Type", "content_type")]));
    let input = InputValidator::new()
        .field("content_type", ContentTypeHeader::new(["application/json"]))
        .validate(extractor.extract(raw)?)?;

    let request = verify_input(user_schema)(app.create_request(input, None))?;
    record_query(Duration::from_millis(4));

    let name = request.get("name").and_then(Value::as_str).unwrap_or_default();
    if request.env().taken.iter().any(|taken| *taken == name) {
        return Err(AppError::conflict(format!("User '{name}' already exists")));
    }

    let mut created = request.input().clone();
    created.remove("content_type");
    to_created(created)
}

struct Harness {
    chain: Chain,
    sink: Arc<RecordingSink>,
    releaser: Arc<CountingReleaser>,
}

fn harness() -> Harness {
    let app = Arc::new(App::new(Directory {
        taken: vec!["admin"],
    }));
    let web = Web::default();
    let sink = Arc::new(RecordingSink::default());
    let releaser = Arc::new(CountingReleaser::default());

    let handler = handler_fn(move |req: Request<Body>| {
        let app = Arc::clone(&app);
        let web = web.clone();
        async move {
            let (parts, body) = req.into_parts();
            let bytes = body.collect().await.map(|c| c.to_bytes()).unwrap_or_default();
            let raw = RawRequest::from_parts(&parts, &bytes)?;

            let mut response = web.process(create_user(&app, &raw))?;
            response
                .extensions_mut()
                .insert(MatchedRoute("/users".to_string()));
            Ok(response)
        }
    });

    let chain = MiddlewareBuilder::new()
        .with_logging()
        .with_stats(Arc::clone(&sink) as Arc<dyn StatsSink>, "web.request")
        .with_db_stats(Arc::clone(&sink) as Arc<dyn StatsSink>, "web.request.db")
        .with_connection_management(Arc::clone(&releaser) as Arc<dyn ConnectionReleaser>)
        .build_chain(handler);

    Harness {
        chain,
        sink,
        releaser,
    }
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/users?trace=1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::new(Bytes::from(body.to_string())))
        .unwrap()
}

async fn json_body(response: http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_created_user() {
    let harness = harness();

    let response = harness
        .chain
        .handle(post_json(json!({"name": "ada", "role": "editor", "admin": true})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(
        json_body(response).await,
        json!({"name": "ada", "role": "editor"})
    );
    assert_eq!(harness.releaser.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stats_are_tagged_with_route() {
    let harness = harness();

    harness
        .chain
        .handle(post_json(json!({"name": "ada"})))
        .await
        .unwrap();

    let names = harness.sink.names();
    assert!(names.contains(&"web.request".to_string()));
    assert!(names.contains(&"web.request.db.runtime".to_string()));
    assert!(names.contains(&"web.request.db.queries".to_string()));

    let request_tags = harness.sink.tags_for("web.request").unwrap();
    assert!(request_tags.contains(&"path:/users".to_string()));
    assert!(request_tags.contains(&"method:POST".to_string()));
    assert!(request_tags.contains(&"status:201".to_string()));
}

#[tokio::test]
async fn test_schema_failure_is_unprocessable() {
    let harness = harness();

    let response = harness
        .chain
        .handle(post_json(json!({"role": "editor"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["message"], json!("'name' is missing"));
    assert_eq!(body["debug_message"], json!("'name' must be a string"));
}

#[tokio::test]
async fn test_domain_conflict() {
    let harness = harness();

    let response = harness
        .chain
        .handle(post_json(json!({"name": "admin"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        json_body(response).await["message"],
        json!("User 'admin' already exists")
    );
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let harness = harness();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::new(Bytes::from_static(b"name=ada")))
        .unwrap();
    let response = harness.chain.handle(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        json_body(response).await["message"],
        json!("Unsupported Content-Type Header 'application/x-www-form-urlencoded'")
    );
}

#[tokio::test]
async fn test_malformed_body_still_releases_connections() {
    let harness = harness();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::new(Bytes::from_static(b"[1, 2")))
        .unwrap();
    let result = harness.chain.handle(request).await;

    assert!(result.is_err());
    assert_eq!(harness.releaser.releases.load(Ordering::SeqCst), 1);
    assert!(harness
        .sink
        .names()
        .contains(&"web.request.db.runtime".to_string()));
}

#[tokio::test]
async fn test_test_requests_keep_connections() {
    let harness = harness();

    let mut request = post_json(json!({"name": "grace"}));
    request.extensions_mut().insert(TestRequest);
    let response = harness.chain.handle(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(harness.releaser.releases.load(Ordering::SeqCst), 0);
}
