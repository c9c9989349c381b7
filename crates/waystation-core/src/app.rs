//! Application container

use crate::hooks::{Hook, HookPublisher, HookRegistry, Listener};
use crate::input::Input;
use crate::request::{AppRequest, HookInitializer};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::Span;

/// Owns the application environment and its hooks, and creates requests.
pub struct App<E> {
    env: Arc<E>,
    hooks: Arc<HashMap<String, Arc<dyn Hook>>>,
    registry: HookRegistry,
}

impl<E> App<E> {
    /// Create an App without hooks
    pub fn new(env: E) -> Self {
        Self {
            env: Arc::new(env),
            hooks: Arc::new(HashMap::new()),
            registry: HookRegistry::new(),
        }
    }

    /// Add a hook under `hook_type`
    #[must_use]
    pub fn with_hook(mut self, hook_type: impl Into<String>, hook: Arc<dyn Hook>) -> Self {
        let mut hooks = (*self.hooks).clone();
        hooks.insert(hook_type.into(), hook);
        self.hooks = Arc::new(hooks);
        self
    }

    /// Connect every hook to the listener registry
    pub fn start(&self) {
        for (hook_type, hook) in self.hooks.iter() {
            tracing::debug!(hook_type = %hook_type, "Starting hook listener");
            hook.start_listening(HookPublisher::new(hook_type.clone(), self.registry.clone()));
        }
    }

    /// Create a request carrying this App's environment and hooks
    pub fn create_request(&self, input: Input, span: Option<Span>) -> AppRequest<E> {
        AppRequest::new(
            Arc::clone(&self.env),
            input,
            Some(self.hook_initializer()),
            span,
        )
    }

    /// Be notified whenever a `hook_type` process completes
    pub fn register_listener(&self, hook_type: impl Into<String>, listener: Listener) {
        self.registry.register(hook_type, listener);
    }

    /// Listener registry shared with the hooks
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Application environment
    pub fn env(&self) -> &E {
        &self.env
    }

    fn hook_initializer(&self) -> HookInitializer {
        let hooks = Arc::clone(&self.hooks);
        Arc::new(move |hook_type: &str, payload: Value| {
            let hook = hooks
                .get(hook_type)
                .ok_or_else(|| Error::UnknownHook(hook_type.to_string()))?;
            hook.init(payload)
        })
    }
}

impl<E> fmt::Debug for App<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Hook that completes synchronously, useful for local development and tests.
///
/// `init` immediately publishes the payload to the listeners.
#[derive(Default)]
pub struct ImmediateHook {
    publisher: parking_lot::Mutex<Option<HookPublisher>>,
}

impl ImmediateHook {
    /// Create a hook that is not yet listening
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for ImmediateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmediateHook")
            .field("listening", &self.publisher.lock().is_some())
            .finish()
    }
}

impl Hook for ImmediateHook {
    fn init(&self, payload: Value) -> Result<()> {
        let publisher = self.publisher.lock().clone();
        match publisher {
            Some(publisher) => {
                publisher.publish(&payload);
                Ok(())
            }
            None => Err(Error::hook("immediate", "hook was not started")),
        }
    }

    fn start_listening(&self, publisher: HookPublisher) {
        *self.publisher.lock() = Some(publisher);
    }
}
