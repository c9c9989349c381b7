//! Input extractors
//!
//! An extractor turns a [`RawRequest`] into an [`Input`] map. Extractors
//! compose: [`InputExtractor::merge`] runs two of them and shallow-merges the
//! results, right side winning; [`InputExtractor::coerce`] and
//! [`InputExtractor::rename`] post-process the output.
//!
//! Missing fields are left out of the output, they never show up as `null`.

pub mod coercion;
pub mod headers;
pub mod params;
pub mod rename;

pub use coercion::{CoercionRules, InputCoercer};
pub use headers::HeadersExtractor;
pub use params::{Filter, ParamExtractor, ParamSource};
pub use rename::{InputRenamer, RenameRules};

use crate::raw_request::RawRequest;
use std::fmt;
use std::sync::Arc;
use waystation_core::{merge_input, AppError, Input};

/// Pulls an input map out of a request
pub trait InputExtractor: Send + Sync + fmt::Debug {
    /// Extract the input
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError>;

    /// Run `self` then `other`, keys from `other` win
    fn merge<O>(self, other: O) -> CombinedInputExtractor
    where
        Self: Sized + 'static,
        O: InputExtractor + 'static,
    {
        CombinedInputExtractor::new(vec![Arc::new(self), Arc::new(other)])
    }

    /// Apply per-field coercions to the output
    fn coerce(self, rules: CoercionRules) -> InputCoercer<Self>
    where
        Self: Sized,
    {
        InputCoercer::new(self, rules)
    }

    /// Move fields to new keys in the output
    fn rename(self, rules: RenameRules) -> InputRenamer<Self>
    where
        Self: Sized,
    {
        InputRenamer::new(self, rules)
    }
}

impl<T: InputExtractor + ?Sized> InputExtractor for Arc<T> {
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        (**self).extract(request)
    }
}

/// Several extractors run in order, outputs merged left to right
#[derive(Debug, Clone, Default)]
pub struct CombinedInputExtractor {
    extractors: Vec<Arc<dyn InputExtractor>>,
}

impl CombinedInputExtractor {
    /// Combine the given extractors
    pub fn new(extractors: Vec<Arc<dyn InputExtractor>>) -> Self {
        Self { extractors }
    }

    /// Append one more extractor; its keys win over everything before it
    pub fn merge<O: InputExtractor + 'static>(mut self, other: O) -> Self {
        self.extractors.push(Arc::new(other));
        self
    }

    /// Number of extractors
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no extractor is combined
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl InputExtractor for CombinedInputExtractor {
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        self.extractors
            .iter()
            .try_fold(Input::new(), |input, extractor| {
                Ok(merge_input(input, extractor.extract(request)?))
            })
    }
}

/// Ignores the request and returns a fixed input
#[derive(Debug, Clone, Default)]
pub struct ConstantInput(pub Input);

impl InputExtractor for ConstantInput {
    fn extract(&self, _request: &RawRequest) -> Result<Input, AppError> {
        Ok(self.0.clone())
    }
}

/// Extractor backed by a closure
pub struct FnExtractor<F> {
    f: F,
}

impl<F> fmt::Debug for FnExtractor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExtractor").finish_non_exhaustive()
    }
}

impl<F> InputExtractor for FnExtractor<F>
where
    F: Fn(&RawRequest) -> Result<Input, AppError> + Send + Sync,
{
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        (self.f)(request)
    }
}

/// Wrap a closure as an extractor
pub fn extractor_fn<F>(f: F) -> FnExtractor<F>
where
    F: Fn(&RawRequest) -> Result<Input, AppError> + Send + Sync,
{
    FnExtractor { f }
}
