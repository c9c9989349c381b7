//! Input verification against a schema

use crate::app_error::{AppError, InvalidInput};
use crate::input::{FieldErrors, Input};
use crate::request::AppRequest;

/// Result of running a [`Schema`] over request input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaOutcome {
    /// Input after schema coercion
    pub output: Input,
    /// Per-field errors; empty when the input is valid
    pub errors: FieldErrors,
    /// Per-field hints describing the expected shape
    pub hints: FieldErrors,
}

impl SchemaOutcome {
    /// Valid outcome carrying `output`
    pub fn valid(output: Input) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    /// Whether the input passed the schema
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A validation schema for request input
pub trait Schema {
    /// Validate `input`
    fn call(&self, input: &Input) -> SchemaOutcome;
}

impl<F> Schema for F
where
    F: Fn(&Input) -> SchemaOutcome,
{
    fn call(&self, input: &Input) -> SchemaOutcome {
        self(input)
    }
}

/// Build a request step that checks the request input against `schema`.
///
/// On success the request input is replaced with the schema output; on
/// failure the step fails with [`AppError::InvalidInput`] carrying the
/// schema's errors and hints.
pub fn verify_input<E, S>(schema: S) -> impl Fn(AppRequest<E>) -> Result<AppRequest<E>, AppError>
where
    S: Schema,
{
    move |request| {
        let outcome = schema.call(request.input());

        if outcome.is_success() {
            Ok(request.replace_input(outcome.output))
        } else {
            Err(AppError::InvalidInput(
                InvalidInput::new(outcome.errors).with_hints(outcome.hints),
            ))
        }
    }
}
