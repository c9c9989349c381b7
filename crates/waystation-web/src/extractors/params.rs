use super::InputExtractor;
use crate::raw_request::RawRequest;
use waystation_core::{AppError, Input};

/// Field selected by a [`ParamExtractor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Plain field
    Field(String),
    /// Field whose value is expected to hold the listed sub-fields.
    ///
    /// Only the top-level name selects anything; the value is kept whole.
    Nested(String, Vec<Filter>),
}

impl Filter {
    /// Nested filter
    pub fn nested<I, F>(name: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter>,
    {
        Filter::Nested(name.into(), children.into_iter().map(Into::into).collect())
    }

    /// Top-level field name
    pub fn name(&self) -> &str {
        match self {
            Filter::Field(name) | Filter::Nested(name, _) => name,
        }
    }
}

impl From<&str> for Filter {
    fn from(name: &str) -> Self {
        Filter::Field(name.to_string())
    }
}

impl From<String> for Filter {
    fn from(name: String) -> Self {
        Filter::Field(name)
    }
}

/// Decoded map a [`ParamExtractor`] reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Query string
    Query,
    /// Request body
    Body,
}

/// Selects named top-level fields from the query string or the body.
///
/// A field is copied only when its key is present; an explicit `null` is kept
/// as `null`.
#[derive(Debug, Clone)]
pub struct ParamExtractor {
    filters: Vec<Filter>,
    source: ParamSource,
}

impl ParamExtractor {
    /// Extractor over `source`
    pub fn new<I, F>(source: ParamSource, filters: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter>,
    {
        Self {
            filters: filters.into_iter().map(Into::into).collect(),
            source,
        }
    }

    /// Extractor over the query string
    pub fn query<I, F>(filters: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter>,
    {
        Self::new(ParamSource::Query, filters)
    }

    /// Extractor over the request body
    pub fn body<I, F>(filters: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter>,
    {
        Self::new(ParamSource::Body, filters)
    }
}

impl InputExtractor for ParamExtractor {
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        let source = match self.source {
            ParamSource::Query => request.query(),
            ParamSource::Body => request.body(),
        };

        Ok(self
            .filters
            .iter()
            .filter_map(|filter| {
                source
                    .get(filter.name())
                    .map(|value| (filter.name().to_string(), value.clone()))
            })
            .collect())
    }
}
