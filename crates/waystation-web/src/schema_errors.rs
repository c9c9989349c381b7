//! 422 responses built from nested validation output

use crate::responses::ErrorResponse;
use serde_json::{Map, Value};
use waystation_core::FieldErrors;

/// Builds an Unprocessable Entity response from schema errors and hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnprocessableEntityFromSchemaErrors;

impl UnprocessableEntityFromSchemaErrors {
    /// Create the response.
    ///
    /// `errors` produce the message (`None` leaves it null), `hints` the debug
    /// message. With `form_errors` set the raw `errors` map is echoed in the
    /// body.
    pub fn create(
        errors: Option<&FieldErrors>,
        hints: Option<&FieldErrors>,
        base_error: Option<Map<String, Value>>,
        form_errors: bool,
    ) -> ErrorResponse {
        let message = errors.map(parse_errors);
        let debug_message = hints.map(parse_hints).unwrap_or_default();

        ErrorResponse::unprocessable_entity()
            .with_optional_message(message)
            .with_debug_message(debug_message)
            .with_base_error(base_error)
            .with_form_errors(if form_errors { errors.cloned() } else { None })
    }
}

/// Flatten field errors into `'field' a and b. 'parent.child' c`
pub fn parse_errors(errors: &FieldErrors) -> String {
    let mut segments = Vec::new();
    collect(errors, None, false, &mut segments);
    segments.join(". ")
}

/// Same as [`parse_errors`] but entries without messages are left out
pub fn parse_hints(hints: &FieldErrors) -> String {
    let mut segments = Vec::new();
    collect(hints, None, true, &mut segments);
    segments.join(". ")
}

fn collect(fields: &FieldErrors, prefix: Option<&str>, skip_empty: bool, out: &mut Vec<String>) {
    for (field, value) in fields {
        let name = match prefix {
            Some(parent) => format!("{parent}.{field}"),
            None => field.clone(),
        };

        match value {
            Value::Object(nested) => collect(nested, Some(&name), skip_empty, out),
            Value::Array(items) => {
                if skip_empty && items.is_empty() {
                    continue;
                }
                let messages: Vec<String> = items.iter().map(message_text).collect();
                out.push(format!("'{name}' {}", messages.join(" and ")));
            }
            other => out.push(format!("'{name}' {}", message_text(other))),
        }
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test value must be an object"),
        }
    }

    #[test]
    fn test_single_message() {
        let errors = map(json!({"content": ["is missing"]}));
        let response =
            UnprocessableEntityFromSchemaErrors::create(Some(&errors), Some(&errors), None, true);

        assert_eq!(response.status().code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.message(), Some("'content' is missing"));
        assert_eq!(response.debug_message(), "'content' is missing");
        assert_eq!(
            response.body().get("form_errors"),
            Some(&Value::Object(errors))
        );
    }

    #[test]
    fn test_multiple_messages_are_joined() {
        let errors = map(json!({"content": ["is missing", "is invalid"]}));
        let response =
            UnprocessableEntityFromSchemaErrors::create(Some(&errors), Some(&errors), None, false);

        assert_eq!(response.message(), Some("'content' is missing and is invalid"));
    }

    #[test]
    fn test_nested_errors() {
        let errors = map(json!({
            "status": ["is missing", "is invalid"],
            "message": {"id": ["is missing"], "content": ["is invalid"]},
            "context": ["is invalid"]
        }));
        let response =
            UnprocessableEntityFromSchemaErrors::create(Some(&errors), Some(&errors), None, false);

        let expected = "'status' is missing and is invalid. 'message.id' is missing. \
                        'message.content' is invalid. 'context' is invalid";
        assert_eq!(response.message(), Some(expected));
        assert_eq!(response.debug_message(), expected);
    }

    #[test]
    fn test_empty_hints_are_skipped() {
        let hints = map(json!({"name": [], "age": ["must be positive"], "meta": {}}));
        assert_eq!(parse_hints(&hints), "'age' must be positive");
    }

    #[test]
    fn test_form_errors_omitted_by_default() {
        let errors = map(json!({"content": ["is missing"]}));
        let response =
            UnprocessableEntityFromSchemaErrors::create(Some(&errors), Some(&errors), None, false);

        assert!(!response.body().contains_key("form_errors"));
    }

    #[test]
    fn test_base_error_is_kept() {
        let errors = map(json!({"content": ["is missing"]}));
        let base = map(json!({"info": "info"}));
        let response = UnprocessableEntityFromSchemaErrors::create(
            Some(&errors),
            None,
            Some(base.clone()),
            false,
        );

        assert_eq!(response.base_error(), Some(&base));
        assert_eq!(response.body().get("info"), Some(&json!("info")));
    }

    #[test]
    fn test_no_errors_and_hints() {
        let response = UnprocessableEntityFromSchemaErrors::create(None, None, None, false);

        assert_eq!(response.message(), None);
        assert_eq!(response.debug_message(), "");
    }
}
