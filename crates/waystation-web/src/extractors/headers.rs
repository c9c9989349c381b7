use super::InputExtractor;
use crate::raw_request::RawRequest;
use serde_json::Value;
use waystation_core::{AppError, Input};

/// Copies selected headers into the input under new keys.
///
/// Header lookup ignores case and `-`/`_` differences. Headers that are not
/// present are skipped.
#[derive(Debug, Clone, Default)]
pub struct HeadersExtractor {
    headers: Vec<(String, String)>,
}

impl HeadersExtractor {
    /// Map each `(header, key)` pair
    pub fn new<I, H, K>(headers: I) -> Self
    where
        I: IntoIterator<Item = (H, K)>,
        H: Into<String>,
        K: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(header, key)| (header.into(), key.into()))
                .collect(),
        }
    }
}

impl InputExtractor for HeadersExtractor {
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        Ok(self
            .headers
            .iter()
            .filter_map(|(header, key)| {
                request
                    .header(header)
                    .map(|value| (key.clone(), Value::String(value.to_owned())))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{header, HeaderValue, Method, Uri};
    use serde_json::json;

    #[test]
    fn test_extracts_present_headers() {
        let request = RawRequest::new(Method::GET, Uri::from_static("/"))
            .with_header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .with_header(
                header::HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("abc"),
            );

        let extractor = HeadersExtractor::new([
            ("Accept", "accept"),
            ("X_REQUEST_ID", "request_id"),
            ("Content-Type", "content_type"),
        ]);
        let input = extractor.extract(&request).unwrap();

        assert_eq!(
            Value::Object(input),
            json!({"accept": "application/json", "request_id": "abc"})
        );
    }
}
