//! Domain error taxonomy
//!
//! Handlers fail with an [`AppError`]. The web layer later maps each variant
//! onto an HTTP response; nothing in here knows about status codes.

use crate::input::FieldErrors;
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Fields shared by every plain domain error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorDetails {
    /// User facing message
    pub message: Option<String>,
    /// Message aimed at the API consumer's developers
    pub debug_message: Option<String>,
    /// Opaque pass-through context merged into the response body
    pub base_error: Option<Map<String, Value>>,
}

impl ErrorDetails {
    /// Details with a user facing message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Details derived from a base error, keeping it as pass-through context.
    ///
    /// A `message` or `debug_message` string inside the base error seeds the
    /// matching field; use the `with_*` setters to override them.
    pub fn from_base(base_error: Map<String, Value>) -> Self {
        let text = |key: &str| {
            base_error
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        Self {
            message: text("message"),
            debug_message: text("debug_message"),
            base_error: Some(base_error),
        }
    }

    /// Set the user facing message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the debug message
    #[must_use]
    pub fn with_debug_message(mut self, debug_message: impl Into<String>) -> Self {
        self.debug_message = Some(debug_message.into());
        self
    }

    /// Attach pass-through context
    #[must_use]
    pub fn with_base_error(mut self, base_error: Map<String, Value>) -> Self {
        self.base_error = Some(base_error);
        self
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.debug_message) {
            (Some(message), _) => f.write_str(message),
            (None, Some(debug_message)) => f.write_str(debug_message),
            (None, None) => f.write_str("no message"),
        }
    }
}

/// Input failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvalidInput {
    /// Per-field error messages, possibly nested
    pub errors: Option<FieldErrors>,
    /// Per-field hints, used to build the debug message
    pub hints: FieldErrors,
    /// Overrides the message derived from `errors`
    pub message: Option<String>,
    /// Overrides the debug message derived from `hints`
    pub debug_message: Option<String>,
    /// Echo the raw `errors` map back to the client as `form_errors`
    pub form_errors: bool,
    /// Opaque pass-through context merged into the response body
    pub base_error: Option<Map<String, Value>>,
}

impl InvalidInput {
    /// Invalid input with the given field errors
    pub fn new(errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::default()
        }
    }

    /// Set the hints
    #[must_use]
    pub fn with_hints(mut self, hints: FieldErrors) -> Self {
        self.hints = hints;
        self
    }

    /// Include the raw errors map in the response body
    #[must_use]
    pub fn with_form_errors(mut self, form_errors: bool) -> Self {
        self.form_errors = form_errors;
        self
    }

    /// Attach pass-through context
    #[must_use]
    pub fn with_base_error(mut self, base_error: Map<String, Value>) -> Self {
        self.base_error = Some(base_error);
        self
    }
}

/// Tag of a built-in [`AppError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`AppError::InvalidInput`]
    InvalidInput,
    /// [`AppError::DependencyUnavailable`]
    DependencyUnavailable,
    /// [`AppError::NotFound`]
    NotFound,
    /// [`AppError::Forbidden`]
    Forbidden,
    /// [`AppError::Conflict`]
    Conflict,
    /// [`AppError::NotAcceptable`]
    NotAcceptable,
    /// [`AppError::UnsupportedMediaType`]
    UnsupportedMediaType,
    /// [`AppError::RequestEntityTooLarge`]
    RequestEntityTooLarge,
    /// [`AppError::BadRequest`]
    BadRequest,
}

impl ErrorKind {
    /// Every built-in kind, in mapping order
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::InvalidInput,
        ErrorKind::DependencyUnavailable,
        ErrorKind::NotFound,
        ErrorKind::Forbidden,
        ErrorKind::Conflict,
        ErrorKind::NotAcceptable,
        ErrorKind::UnsupportedMediaType,
        ErrorKind::RequestEntityTooLarge,
        ErrorKind::BadRequest,
    ];

    /// Snake-case name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::DependencyUnavailable => "dependency_currently_unavailable",
            ErrorKind::NotFound => "requested_resource_not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotAcceptable => "not_acceptable",
            ErrorKind::UnsupportedMediaType => "unsupported_media_type",
            ErrorKind::RequestEntityTooLarge => "request_entity_too_large",
            ErrorKind::BadRequest => "bad_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

trait ErasedError: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + fmt::Debug> ErasedError for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Application-defined error outside the built-in taxonomy.
///
/// Only an error mapper entry registered for the concrete type can turn it
/// into a response.
#[derive(Clone)]
pub struct CustomError {
    value: Arc<dyn ErasedError>,
    type_name: &'static str,
}

impl CustomError {
    /// Wrap an application error value
    pub fn new<T: Any + Send + Sync + fmt::Debug>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the wrapped value if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.erased().downcast_ref::<T>()
    }

    /// `TypeId` of the wrapped value
    pub fn value_type_id(&self) -> TypeId {
        self.erased().type_id()
    }

    fn erased(&self) -> &dyn Any {
        // Dispatch through the vtable of the wrapped value, not the `Arc`.
        (*self.value).as_any()
    }

    /// Type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomError").field(&self.value).finish()
    }
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl PartialEq for CustomError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// Expected failure produced by application logic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    /// Input failed validation
    #[error("invalid input")]
    InvalidInput(InvalidInput),

    /// A dependency could not be reached
    #[error("dependency currently unavailable: {0}")]
    DependencyUnavailable(ErrorDetails),

    /// Requested resource does not exist
    #[error("requested resource not found: {0}")]
    NotFound(ErrorDetails),

    /// Caller is not allowed to perform the operation
    #[error("forbidden: {0}")]
    Forbidden(ErrorDetails),

    /// Operation conflicts with current state
    #[error("conflict: {0}")]
    Conflict(ErrorDetails),

    /// Requested representation cannot be produced
    #[error("not acceptable: {0}")]
    NotAcceptable(ErrorDetails),

    /// Request body media type is not supported
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(ErrorDetails),

    /// Request body is too large
    #[error("request entity too large: {0}")]
    RequestEntityTooLarge(ErrorDetails),

    /// Malformed request
    #[error("bad request: {0}")]
    BadRequest(ErrorDetails),

    /// Plain structured error without a dedicated variant
    #[error("structured error")]
    Structured(Map<String, Value>),

    /// Application-defined error type
    #[error("{0}")]
    Custom(CustomError),
}

impl AppError {
    /// Build a built-in variant from its kind and details.
    ///
    /// For [`ErrorKind::InvalidInput`] the details become explicit message
    /// overrides on an otherwise empty [`InvalidInput`].
    pub fn from_details(kind: ErrorKind, details: ErrorDetails) -> Self {
        match kind {
            ErrorKind::InvalidInput => AppError::InvalidInput(InvalidInput {
                message: details.message,
                debug_message: details.debug_message,
                base_error: details.base_error,
                ..InvalidInput::default()
            }),
            ErrorKind::DependencyUnavailable => AppError::DependencyUnavailable(details),
            ErrorKind::NotFound => AppError::NotFound(details),
            ErrorKind::Forbidden => AppError::Forbidden(details),
            ErrorKind::Conflict => AppError::Conflict(details),
            ErrorKind::NotAcceptable => AppError::NotAcceptable(details),
            ErrorKind::UnsupportedMediaType => AppError::UnsupportedMediaType(details),
            ErrorKind::RequestEntityTooLarge => AppError::RequestEntityTooLarge(details),
            ErrorKind::BadRequest => AppError::BadRequest(details),
        }
    }

    /// Build a built-in variant from a base error
    pub fn from_base(kind: ErrorKind, base_error: Map<String, Value>) -> Self {
        Self::from_details(kind, ErrorDetails::from_base(base_error))
    }

    /// Wrap an application-defined error
    pub fn custom<T: Any + Send + Sync + fmt::Debug>(value: T) -> Self {
        AppError::Custom(CustomError::new(value))
    }

    /// Invalid input with the given field errors and hints
    pub fn invalid_input(errors: FieldErrors, hints: FieldErrors) -> Self {
        AppError::InvalidInput(InvalidInput::new(errors).with_hints(hints))
    }

    /// Not found with a message
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(ErrorDetails::message(message))
    }

    /// Forbidden with a message
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(ErrorDetails::message(message))
    }

    /// Conflict with a message
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(ErrorDetails::message(message))
    }

    /// Bad request with a message
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(ErrorDetails::message(message))
    }

    /// Dependency unavailable with a message
    pub fn dependency_unavailable(message: impl Into<String>) -> Self {
        AppError::DependencyUnavailable(ErrorDetails::message(message))
    }

    /// Tag of a built-in variant; `None` for structured and custom errors
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::InvalidInput(_) => Some(ErrorKind::InvalidInput),
            AppError::DependencyUnavailable(_) => Some(ErrorKind::DependencyUnavailable),
            AppError::NotFound(_) => Some(ErrorKind::NotFound),
            AppError::Forbidden(_) => Some(ErrorKind::Forbidden),
            AppError::Conflict(_) => Some(ErrorKind::Conflict),
            AppError::NotAcceptable(_) => Some(ErrorKind::NotAcceptable),
            AppError::UnsupportedMediaType(_) => Some(ErrorKind::UnsupportedMediaType),
            AppError::RequestEntityTooLarge(_) => Some(ErrorKind::RequestEntityTooLarge),
            AppError::BadRequest(_) => Some(ErrorKind::BadRequest),
            AppError::Structured(_) | AppError::Custom(_) => None,
        }
    }

    /// Shared details of a plain built-in variant
    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            AppError::DependencyUnavailable(details)
            | AppError::NotFound(details)
            | AppError::Forbidden(details)
            | AppError::Conflict(details)
            | AppError::NotAcceptable(details)
            | AppError::UnsupportedMediaType(details)
            | AppError::RequestEntityTooLarge(details)
            | AppError::BadRequest(details) => Some(details),
            AppError::InvalidInput(_) | AppError::Structured(_) | AppError::Custom(_) => None,
        }
    }

    /// Pass-through context, if any
    pub fn base_error(&self) -> Option<&Map<String, Value>> {
        match self {
            AppError::InvalidInput(invalid) => invalid.base_error.as_ref(),
            AppError::Structured(map) => Some(map),
            AppError::Custom(_) => None,
            other => other.details().and_then(|d| d.base_error.as_ref()),
        }
    }
}
