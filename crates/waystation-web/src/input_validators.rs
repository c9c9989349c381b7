//! Header validators for use with [`InputValidator`](crate::InputValidator)

use crate::input_validator::Validation;
use serde_json::Value;
use waystation_core::{AppError, ErrorDetails};

fn header_text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or_default()
}

/// Accepts only the listed `Accept` header values; an empty list allows all.
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
    allowed: Vec<String>,
}

impl AcceptHeader {
    /// Allow the given media types
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validation for AcceptHeader {
    fn validate(&self, value: Option<&Value>) -> Result<(), AppError> {
        let header = header_text(value);
        if self.allowed.is_empty() || self.allowed.iter().any(|allowed| allowed == header) {
            return Ok(());
        }

        Err(AppError::NotAcceptable(
            ErrorDetails::message(format!("Unsupported Accept Header '{header}'"))
                .with_debug_message(format!(
                    "Available Accept Headers are {}",
                    self.allowed.join(", ")
                )),
        ))
    }
}

/// Accepts only the listed `Content-Type` media types; an empty list allows
/// all. Parameters after `;` are ignored when comparing.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeHeader {
    allowed: Vec<String>,
}

impl ContentTypeHeader {
    /// Allow the given media types
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validation for ContentTypeHeader {
    fn validate(&self, value: Option<&Value>) -> Result<(), AppError> {
        let header = header_text(value);
        let media_type = header.split(';').next().unwrap_or_default();
        if self.allowed.is_empty() || self.allowed.iter().any(|allowed| allowed == media_type) {
            return Ok(());
        }

        Err(AppError::UnsupportedMediaType(
            ErrorDetails::message(format!("Unsupported Content-Type Header '{header}'"))
                .with_debug_message(format!(
                    "Available Content-Type Headers are {}",
                    self.allowed.join(", ")
                )),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accept_header_allowed() {
        let validator = AcceptHeader::new(["application/json"]);
        assert!(validator.validate(Some(&json!("application/json"))).is_ok());
    }

    #[test]
    fn test_accept_header_empty_list_allows_all() {
        let validator = AcceptHeader::new(Vec::<String>::new());
        assert!(validator.validate(Some(&json!("text/html"))).is_ok());
        assert!(validator.validate(None).is_ok());
    }

    #[test]
    fn test_accept_header_rejected() {
        let validator = AcceptHeader::new(["application/json", "application/xml"]);
        let err = validator.validate(Some(&json!("text/html"))).unwrap_err();

        assert_eq!(
            err,
            AppError::NotAcceptable(
                ErrorDetails::message("Unsupported Accept Header 'text/html'")
                    .with_debug_message("Available Accept Headers are application/json, application/xml")
            )
        );
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        let validator = ContentTypeHeader::new(["multipart/form-data"]);
        assert!(validator
            .validate(Some(&json!("multipart/form-data; boundary=xyz")))
            .is_ok());
    }

    #[test]
    fn test_content_type_rejected() {
        let validator = ContentTypeHeader::new(["application/json"]);
        let err = validator.validate(Some(&json!("text/plain; charset=utf-8"))).unwrap_err();

        assert_eq!(
            err,
            AppError::UnsupportedMediaType(
                ErrorDetails::message("Unsupported Content-Type Header 'text/plain; charset=utf-8'")
                    .with_debug_message("Available Content-Type Headers are application/json")
            )
        );
    }

    #[test]
    fn test_missing_content_type_rejected() {
        let validator = ContentTypeHeader::new(["application/json"]);
        assert!(matches!(
            validator.validate(None),
            Err(AppError::UnsupportedMediaType(_))
        ));
    }
}
