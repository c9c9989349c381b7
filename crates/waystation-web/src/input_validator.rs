//! Per-field validation of extracted input

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use waystation_core::{AppError, Input};

/// Validates a single input field.
///
/// `None` means the field is absent or `null`.
pub trait Validation: Send + Sync {
    /// Check the field value
    fn validate(&self, value: Option<&Value>) -> Result<(), AppError>;
}

impl<F> Validation for F
where
    F: Fn(Option<&Value>) -> Result<(), AppError> + Send + Sync,
{
    fn validate(&self, value: Option<&Value>) -> Result<(), AppError> {
        self(value)
    }
}

/// Runs field validations in declaration order and stops at the first
/// failure.
#[derive(Clone, Default)]
pub struct InputValidator {
    validations: Vec<(String, Arc<dyn Validation>)>,
}

impl InputValidator {
    /// No validations
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `key` with `validation`
    #[must_use]
    pub fn field<V>(mut self, key: impl Into<String>, validation: V) -> Self
    where
        V: Validation + 'static,
    {
        self.validations.push((key.into(), Arc::new(validation)));
        self
    }

    /// Return the input unchanged if every validation passes
    pub fn validate(&self, input: Input) -> Result<Input, AppError> {
        for (key, validation) in &self.validations {
            let value = input.get(key).filter(|value| !value.is_null());
            validation.validate(value)?;
        }
        Ok(input)
    }
}

impl fmt::Debug for InputValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputValidator")
            .field(
                "fields",
                &self.validations.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            )
            .finish()
    }
}
