//! Application request

use crate::input::{merge_input, Input};
use crate::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::Span;

/// Starts a named hook; supplied by the owning App
pub type HookInitializer = Arc<dyn Fn(&str, Value) -> Result<()> + Send + Sync>;

/// Input plus the shared application environment, flowing through a chain
/// of handler steps.
///
/// A request is never mutated: [`with_input`](Self::with_input) and
/// [`replace_input`](Self::replace_input) build a new request that shares the
/// environment, hook initializer and span.
pub struct AppRequest<E> {
    env: Arc<E>,
    input: Input,
    initialize_hook: Option<HookInitializer>,
    span: Option<Span>,
}

impl<E> AppRequest<E> {
    /// Create a request
    pub fn new(
        env: Arc<E>,
        input: Input,
        initialize_hook: Option<HookInitializer>,
        span: Option<Span>,
    ) -> Self {
        Self {
            env,
            input,
            initialize_hook,
            span,
        }
    }

    /// Application environment
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Shared handle to the application environment
    pub fn env_arc(&self) -> Arc<E> {
        Arc::clone(&self.env)
    }

    /// Current input
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Look up a single input field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    /// Consume the request, keeping only its input
    pub fn into_input(self) -> Input {
        self.input
    }

    /// Tracing span of the request
    pub fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    /// New request whose input is this input shallow-merged with `additions`
    #[must_use]
    pub fn with_input(&self, additions: Input) -> Self {
        self.replace_input(merge_input(self.input.clone(), additions))
    }

    /// New request with `input` as its entire input
    #[must_use]
    pub fn replace_input(&self, input: Input) -> Self {
        Self {
            env: Arc::clone(&self.env),
            input,
            initialize_hook: self.initialize_hook.clone(),
            span: self.span.clone(),
        }
    }

    /// Start an asynchronous application hook.
    ///
    /// Register a listener on the App to be told when the process completes.
    pub fn initialize_hook(&self, hook_type: &str, payload: Value) -> Result<()> {
        let initialize = self
            .initialize_hook
            .as_ref()
            .ok_or(crate::Error::HooksNotConfigured)?;
        initialize(hook_type, payload)
    }
}

impl<E> Clone for AppRequest<E> {
    fn clone(&self) -> Self {
        self.replace_input(self.input.clone())
    }
}

impl<E> fmt::Debug for AppRequest<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRequest")
            .field("input", &self.input)
            .field("hooks", &self.initialize_hook.is_some())
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}
