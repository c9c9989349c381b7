use super::InputExtractor;
use crate::raw_request::RawRequest;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use waystation_core::{AppError, Input};

type Coercion = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Per-field value transformations
#[derive(Clone, Default)]
pub struct CoercionRules {
    rules: Vec<(String, Coercion)>,
}

impl CoercionRules {
    /// No rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform `field` with `f` whenever it is present
    #[must_use]
    pub fn field<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.rules.push((field.into(), Arc::new(f)));
        self
    }

    fn apply(&self, mut input: Input) -> Input {
        for (field, coerce) in &self.rules {
            if let Some(value) = input.get_mut(field) {
                *value = coerce(value.take());
            }
        }
        input
    }
}

impl fmt::Debug for CoercionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(field, _)| field))
            .finish()
    }
}

/// Extractor whose output goes through [`CoercionRules`]
#[derive(Debug, Clone)]
pub struct InputCoercer<X> {
    extractor: X,
    rules: CoercionRules,
}

impl<X> InputCoercer<X> {
    /// Wrap `extractor`
    pub fn new(extractor: X, rules: CoercionRules) -> Self {
        Self { extractor, rules }
    }
}

impl<X: InputExtractor> InputExtractor for InputCoercer<X> {
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        self.extractor
            .extract(request)
            .map(|input| self.rules.apply(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{ConstantInput, ParamExtractor};
    use http::{Method, Uri};
    use serde_json::json;

    fn input(value: Value) -> Input {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn test_coerces_present_fields_only() {
        let request = RawRequest::new(Method::POST, Uri::from_static("/"))
            .with_body(input(json!({"x": "a", "y": "b"})));

        let extractor = ParamExtractor::body(["x", "y"]).coerce(
            CoercionRules::new()
                .field("x", |value| json!(format!("x_{}", value.as_str().unwrap_or_default())))
                .field("z", |_| json!("never")),
        );

        assert_eq!(
            Value::Object(extractor.extract(&request).unwrap()),
            json!({"x": "x_a", "y": "b"})
        );
    }

    #[test]
    fn test_coerced_extractor_still_merges() {
        let request = RawRequest::new(Method::GET, Uri::from_static("/"));
        let extractor = ConstantInput(input(json!({"page": "2"})))
            .coerce(CoercionRules::new().field("page", |value| {
                value
                    .as_str()
                    .and_then(|page| page.parse::<u64>().ok())
                    .map(Value::from)
                    .unwrap_or(value)
            }))
            .merge(ConstantInput(input(json!({"limit": 10}))));

        assert_eq!(
            Value::Object(extractor.extract(&request).unwrap()),
            json!({"page": 2, "limit": 10})
        );
    }
}
