//! Domain error to response mapping
//!
//! Lookup order for a failed handler result:
//! 1. override registered for the error's [`ErrorKind`]
//! 2. built-in conversion for the kind
//! 3. structured maps become a 500
//! 4. custom errors go to the first converter registered for their type
//!
//! A custom error with no converter is a programming error and surfaces as
//! [`Error::UndefinedErrorClass`].

use crate::responses::{ErrorResponse, Response};
use crate::schema_errors::UnprocessableEntityFromSchemaErrors;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::error;
use waystation_core::{AppError, CustomError, ErrorDetails, ErrorKind, InvalidInput};
use waystation_core::{Error, Result};

/// Converts a built-in domain error into a response
pub type Converter = Arc<dyn Fn(AppError) -> Response + Send + Sync>;

type CustomConverter = Arc<dyn Fn(&CustomError) -> Option<Response> + Send + Sync>;

/// Maps [`AppError`] values onto [`Response`] values.
#[derive(Clone, Default)]
pub struct ErrorMapper {
    overrides: HashMap<ErrorKind, Converter>,
    custom: Vec<CustomConverter>,
}

impl ErrorMapper {
    /// Mapper with the built-in conversions only
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the conversion for a built-in kind
    #[must_use]
    pub fn on<F>(mut self, kind: ErrorKind, convert: F) -> Self
    where
        F: Fn(AppError) -> Response + Send + Sync + 'static,
    {
        self.overrides.insert(kind, Arc::new(convert));
        self
    }

    /// Register a conversion for an application-defined error type
    #[must_use]
    pub fn on_custom<T, F>(mut self, convert: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Response + Send + Sync + 'static,
    {
        self.custom.push(Arc::new(move |custom: &CustomError| {
            custom.downcast_ref::<T>().map(&convert)
        }));
        self
    }

    /// Map a domain error to a response
    pub fn map(&self, err: AppError) -> Result<Response> {
        if let Some(convert) = err.kind().and_then(|kind| self.overrides.get(&kind)) {
            return Ok(convert(err));
        }

        let response: ErrorResponse = match err {
            AppError::InvalidInput(invalid) => invalid_input_response(invalid),
            AppError::DependencyUnavailable(details) => ErrorResponse::service_unavailable()
                .with_optional_message(details.message)
                .with_debug_message("Please try again later")
                .with_base_error(details.base_error),
            AppError::NotFound(details) => with_details(ErrorResponse::not_found(), details),
            AppError::Forbidden(details) => with_details(ErrorResponse::forbidden(), details),
            AppError::Conflict(details) => with_details(ErrorResponse::conflict(), details),
            AppError::NotAcceptable(details) => {
                with_details(ErrorResponse::not_acceptable(), details)
            }
            AppError::UnsupportedMediaType(details) => {
                with_details(ErrorResponse::unsupported_media_type(), details)
            }
            AppError::RequestEntityTooLarge(details) => {
                with_details(ErrorResponse::request_entity_too_large(), details)
            }
            AppError::BadRequest(details) => with_details(ErrorResponse::bad_request(), details),
            AppError::Structured(map) => {
                let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);
                ErrorResponse::internal_error()
                    .with_optional_message(text("message"))
                    .with_optional_debug_message(text("debug_message"))
                    .with_base_error(Some(map))
            }
            AppError::Custom(custom) => return self.map_custom(&custom),
        };

        Ok(response.into())
    }

    fn map_custom(&self, custom: &CustomError) -> Result<Response> {
        if let Some(response) = self.custom.iter().find_map(|convert| convert(custom)) {
            return Ok(response);
        }

        error!(error_class = custom.type_name(), "Undefined error class reached the error mapper");
        Err(Error::UndefinedErrorClass(custom.type_name().to_string()))
    }
}

impl fmt::Debug for ErrorMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMapper")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("custom", &self.custom.len())
            .finish()
    }
}

fn with_details(response: ErrorResponse, details: ErrorDetails) -> ErrorResponse {
    response
        .with_optional_message(details.message)
        .with_optional_debug_message(details.debug_message)
        .with_base_error(details.base_error)
}

fn invalid_input_response(invalid: InvalidInput) -> ErrorResponse {
    let hints = (!invalid.hints.is_empty()).then_some(&invalid.hints);
    let mut response = UnprocessableEntityFromSchemaErrors::create(
        invalid.errors.as_ref(),
        hints,
        invalid.base_error,
        invalid.form_errors,
    );

    if let Some(message) = invalid.message {
        response = response.with_message(message);
    }
    if let Some(debug_message) = invalid.debug_message {
        response = response.with_debug_message(debug_message);
    }
    response
}
