//! Response model
//!
//! Every response variant has a fixed status: the variant *is* the status.
//! Success responses carry an object or array body; error responses render a
//! body with at least `message` and `debug_message`.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use waystation_core::{AppError, FieldErrors};

/// Status of a successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuccessStatus {
    /// 200
    Ok,
    /// 201
    Created,
    /// 202
    Accepted,
    /// 204
    NoContent,
}

impl SuccessStatus {
    /// HTTP status code
    pub fn code(self) -> StatusCode {
        match self {
            SuccessStatus::Ok => StatusCode::OK,
            SuccessStatus::Created => StatusCode::CREATED,
            SuccessStatus::Accepted => StatusCode::ACCEPTED,
            SuccessStatus::NoContent => StatusCode::NO_CONTENT,
        }
    }
}

/// Status of an error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 406
    NotAcceptable,
    /// 409
    Conflict,
    /// 413
    RequestEntityTooLarge,
    /// 415
    UnsupportedMediaType,
    /// 422
    UnprocessableEntity,
    /// 500
    InternalError,
    /// 503
    ServiceUnavailable,
}

impl ErrorStatus {
    /// HTTP status code
    pub fn code(self) -> StatusCode {
        match self {
            ErrorStatus::BadRequest => StatusCode::BAD_REQUEST,
            ErrorStatus::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorStatus::Forbidden => StatusCode::FORBIDDEN,
            ErrorStatus::NotFound => StatusCode::NOT_FOUND,
            ErrorStatus::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ErrorStatus::Conflict => StatusCode::CONFLICT,
            ErrorStatus::RequestEntityTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorStatus::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorStatus::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorStatus::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorStatus::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Body of a successful response: a JSON object or array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SuccessBody {
    /// JSON object
    Object(Map<String, Value>),
    /// JSON array
    Array(Vec<Value>),
}

impl SuccessBody {
    /// Accept an object or array; any other value is handed back
    pub fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(SuccessBody::Object(map)),
            Value::Array(items) => Ok(SuccessBody::Array(items)),
            other => Err(other),
        }
    }

    /// Body as a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            SuccessBody::Object(map) => Value::Object(map.clone()),
            SuccessBody::Array(items) => Value::Array(items.clone()),
        }
    }
}

impl From<Map<String, Value>> for SuccessBody {
    fn from(map: Map<String, Value>) -> Self {
        SuccessBody::Object(map)
    }
}

impl From<Vec<Value>> for SuccessBody {
    fn from(items: Vec<Value>) -> Self {
        SuccessBody::Array(items)
    }
}

/// Successful response
#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    status: SuccessStatus,
    body: SuccessBody,
    headers: HeaderMap,
}

impl Success {
    /// Create a success response
    pub fn new(status: SuccessStatus, body: impl Into<SuccessBody>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HeaderMap::new(),
        }
    }

    /// 200 OK
    pub fn ok(body: impl Into<SuccessBody>) -> Self {
        Self::new(SuccessStatus::Ok, body)
    }

    /// 201 Created
    pub fn created(body: impl Into<SuccessBody>) -> Self {
        Self::new(SuccessStatus::Created, body)
    }

    /// 202 Accepted
    pub fn accepted(body: impl Into<SuccessBody>) -> Self {
        Self::new(SuccessStatus::Accepted, body)
    }

    /// 204 No Content, with an empty object body
    pub fn no_content() -> Self {
        Self::new(SuccessStatus::NoContent, Map::new())
    }

    /// Add a response header
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Status variant
    pub fn status(&self) -> SuccessStatus {
        self.status
    }

    /// Response body
    pub fn body(&self) -> &SuccessBody {
        &self.body
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Error response
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    status: ErrorStatus,
    message: Option<String>,
    debug_message: String,
    context: Map<String, Value>,
    headers: HeaderMap,
    base_error: Option<Map<String, Value>>,
    form_errors: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Create an error response with no message
    pub fn new(status: ErrorStatus) -> Self {
        Self {
            status,
            message: None,
            debug_message: String::new(),
            context: Map::new(),
            headers: HeaderMap::new(),
            base_error: None,
            form_errors: None,
        }
    }

    /// 400 Bad Request
    pub fn bad_request() -> Self {
        Self::new(ErrorStatus::BadRequest)
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::new(ErrorStatus::Unauthorized)
    }

    /// 403 Forbidden
    pub fn forbidden() -> Self {
        Self::new(ErrorStatus::Forbidden)
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::new(ErrorStatus::NotFound)
    }

    /// 406 Not Acceptable
    pub fn not_acceptable() -> Self {
        Self::new(ErrorStatus::NotAcceptable)
    }

    /// 409 Conflict
    pub fn conflict() -> Self {
        Self::new(ErrorStatus::Conflict)
    }

    /// 413 Request Entity Too Large
    pub fn request_entity_too_large() -> Self {
        Self::new(ErrorStatus::RequestEntityTooLarge)
    }

    /// 415 Unsupported Media Type
    pub fn unsupported_media_type() -> Self {
        Self::new(ErrorStatus::UnsupportedMediaType)
    }

    /// 422 Unprocessable Entity
    pub fn unprocessable_entity() -> Self {
        Self::new(ErrorStatus::UnprocessableEntity)
    }

    /// 500 Internal Server Error
    pub fn internal_error() -> Self {
        Self::new(ErrorStatus::InternalError)
    }

    /// 503 Service Unavailable
    pub fn service_unavailable() -> Self {
        Self::new(ErrorStatus::ServiceUnavailable)
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set or clear the message
    #[must_use]
    pub fn with_optional_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Set the debug message
    #[must_use]
    pub fn with_debug_message(mut self, debug_message: impl Into<String>) -> Self {
        self.debug_message = debug_message.into();
        self
    }

    /// Set the debug message; `None` leaves it empty
    #[must_use]
    pub fn with_optional_debug_message(mut self, debug_message: Option<String>) -> Self {
        self.debug_message = debug_message.unwrap_or_default();
        self
    }

    /// Attach server-side context; never rendered into the body
    #[must_use]
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Add a response header
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach pass-through context rendered into the body
    #[must_use]
    pub fn with_base_error(mut self, base_error: Option<Map<String, Value>>) -> Self {
        self.base_error = base_error;
        self
    }

    /// Echo form errors in the body under `form_errors`
    #[must_use]
    pub fn with_form_errors(mut self, form_errors: Option<FieldErrors>) -> Self {
        self.form_errors = form_errors;
        self
    }

    /// Status variant
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Debug message; empty by default
    pub fn debug_message(&self) -> &str {
        &self.debug_message
    }

    /// Server-side context
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Pass-through context
    pub fn base_error(&self) -> Option<&Map<String, Value>> {
        self.base_error.as_ref()
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Render the JSON body.
    ///
    /// The base error seeds the body. `message` and `debug_message` are then
    /// written over it, except that a missing message leaves a base error
    /// message in place.
    pub fn body(&self) -> Map<String, Value> {
        let mut body = self.base_error.clone().unwrap_or_default();

        match &self.message {
            Some(message) => {
                body.insert("message".to_string(), Value::String(message.clone()));
            }
            None => {
                body.entry("message").or_insert(Value::Null);
            }
        }
        body.insert(
            "debug_message".to_string(),
            Value::String(self.debug_message.clone()),
        );

        if let Some(form_errors) = &self.form_errors {
            body.insert("form_errors".to_string(), Value::Object(form_errors.clone()));
        }

        body
    }
}

/// Any response the web layer can write
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// 2xx response
    Success(Success),
    /// 4xx/5xx response
    Error(ErrorResponse),
}

impl Response {
    /// HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            Response::Success(success) => success.status().code(),
            Response::Error(error) => error.status().code(),
        }
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        match self {
            Response::Success(success) => success.headers(),
            Response::Error(error) => error.headers(),
        }
    }

    /// JSON body
    pub fn body(&self) -> Value {
        match self {
            Response::Success(success) => success.body().to_value(),
            Response::Error(error) => Value::Object(error.body()),
        }
    }
}

impl From<Success> for Response {
    fn from(success: Success) -> Self {
        Response::Success(success)
    }
}

impl From<ErrorResponse> for Response {
    fn from(error: ErrorResponse) -> Self {
        Response::Error(error)
    }
}

/// Lift a serializable value into a success response with `status`.
///
/// Values that do not serialize to an object or array fail as a structured
/// error, which maps to a 500.
pub fn to_success<T: Serialize>(status: SuccessStatus, value: T) -> Result<Response, AppError> {
    let value = serde_json::to_value(value).map_err(|err| {
        structured_error(format!("Response body could not be serialized: {err}"))
    })?;

    SuccessBody::from_value(value)
        .map(|body| Success::new(status, body).into())
        .map_err(|other| {
            structured_error(format!(
                "Response body must be an object or an array, got {other}"
            ))
        })
}

/// 200 OK from a serializable value
pub fn to_ok<T: Serialize>(value: T) -> Result<Response, AppError> {
    to_success(SuccessStatus::Ok, value)
}

/// 201 Created from a serializable value
pub fn to_created<T: Serialize>(value: T) -> Result<Response, AppError> {
    to_success(SuccessStatus::Created, value)
}

/// 202 Accepted from a serializable value
pub fn to_accepted<T: Serialize>(value: T) -> Result<Response, AppError> {
    to_success(SuccessStatus::Accepted, value)
}

/// 204 No Content, discarding the value
pub fn to_no_content<T>(_value: T) -> Result<Response, AppError> {
    Ok(Success::no_content().into())
}

fn structured_error(message: String) -> AppError {
    let mut map = Map::new();
    map.insert("message".to_string(), Value::String(message));
    AppError::Structured(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test value must be an object"),
        }
    }

    #[test]
    fn test_success_statuses() {
        assert_eq!(Response::from(Success::ok(Map::new())).status(), StatusCode::OK);
        assert_eq!(
            Response::from(Success::created(vec![json!(1)])).status(),
            StatusCode::CREATED
        );
        assert_eq!(
            Response::from(Success::accepted(Map::new())).status(),
            StatusCode::ACCEPTED
        );
        assert_eq!(
            Response::from(Success::no_content()).status(),
            StatusCode::NO_CONTENT
        );
    }

    #[test]
    fn test_error_statuses() {
        let cases = [
            (ErrorResponse::bad_request(), 400),
            (ErrorResponse::unauthorized(), 401),
            (ErrorResponse::forbidden(), 403),
            (ErrorResponse::not_found(), 404),
            (ErrorResponse::not_acceptable(), 406),
            (ErrorResponse::conflict(), 409),
            (ErrorResponse::request_entity_too_large(), 413),
            (ErrorResponse::unsupported_media_type(), 415),
            (ErrorResponse::unprocessable_entity(), 422),
            (ErrorResponse::internal_error(), 500),
            (ErrorResponse::service_unavailable(), 503),
        ];

        for (response, code) in cases {
            assert_eq!(Response::from(response).status().as_u16(), code);
        }
    }

    #[test]
    fn test_error_body_defaults() {
        let body = ErrorResponse::forbidden().body();
        assert_eq!(Value::Object(body), json!({"message": null, "debug_message": ""}));
    }

    #[test]
    fn test_error_body_with_messages() {
        let body = ErrorResponse::conflict()
            .with_message("Already exists")
            .with_debug_message("Use PUT to update")
            .body();

        assert_eq!(
            Value::Object(body),
            json!({"message": "Already exists", "debug_message": "Use PUT to update"})
        );
    }

    #[test]
    fn test_base_error_does_not_override_explicit_fields() {
        let body = ErrorResponse::not_found()
            .with_message("User not found")
            .with_base_error(Some(map(json!({
                "message": "base message",
                "debug_message": "base debug",
                "resource": "user"
            }))))
            .body();

        assert_eq!(
            Value::Object(body),
            json!({
                "message": "User not found",
                "debug_message": "",
                "resource": "user"
            })
        );
    }

    #[test]
    fn test_base_error_message_kept_when_message_missing() {
        let body = ErrorResponse::not_found()
            .with_base_error(Some(map(json!({"message": "from base"}))))
            .body();

        assert_eq!(body.get("message"), Some(&json!("from base")));
    }

    #[test]
    fn test_context_is_not_rendered() {
        let body = ErrorResponse::internal_error()
            .with_context(map(json!({"trace_id": "abc"})))
            .body();

        assert!(!body.contains_key("trace_id"));
    }

    #[test]
    fn test_form_errors_only_when_present() {
        let without = ErrorResponse::unprocessable_entity().body();
        assert!(!without.contains_key("form_errors"));

        let errors = map(json!({"name": ["is missing"]}));
        let with = ErrorResponse::unprocessable_entity()
            .with_form_errors(Some(errors.clone()))
            .body();
        assert_eq!(with.get("form_errors"), Some(&Value::Object(errors)));
    }

    #[test]
    fn test_headers_are_kept() {
        let response = Response::from(Success::ok(Map::new()).with_header(
            http::header::LOCATION,
            HeaderValue::from_static("/users/1"),
        ));

        assert_eq!(response.headers().get("location").unwrap(), "/users/1");
    }

    #[derive(Serialize)]
    struct User {
        id: u32,
        name: &'static str,
    }

    #[test]
    fn test_to_ok_serializes_value() {
        let response = to_ok(User { id: 1, name: "Ann" }).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), json!({"id": 1, "name": "Ann"}));
    }

    #[test]
    fn test_to_created_with_list() {
        let response = to_created(vec![1, 2]).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body(), json!([1, 2]));
    }

    #[test]
    fn test_to_ok_rejects_scalars() {
        let err = to_ok("just a string").unwrap_err();
        assert!(matches!(err, AppError::Structured(_)));
    }

    #[test]
    fn test_to_no_content_discards_value() {
        let response = to_no_content(User { id: 1, name: "Ann" }).unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.body(), json!({}));
    }
}
