//! Asynchronous application hooks
//!
//! A hook starts some external process (`init`) and later reports its
//! completion. Completion events are fanned out to listeners through a
//! [`HookRegistry`] shared by everything that belongs to one App.

use crate::Result;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with a hook's completion payload
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// An asynchronous process the application can start from a request.
pub trait Hook: Send + Sync + fmt::Debug {
    /// Start the asynchronous process for `payload`
    fn init(&self, payload: Value) -> Result<()>;

    /// Begin delivering completion events through `publisher`.
    ///
    /// Called once by `App::start`. The publisher may be moved to another
    /// thread and used long after this call returns.
    fn start_listening(&self, publisher: HookPublisher);
}

/// Thread-safe map from hook type to its ordered listeners.
///
/// Listeners are never removed; a listener registered before `publish`
/// observes that event.
#[derive(Clone, Default)]
pub struct HookRegistry {
    listeners: Arc<RwLock<HashMap<String, Vec<Listener>>>>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener for `hook_type`
    pub fn register(&self, hook_type: impl Into<String>, listener: Listener) {
        self.listeners
            .write()
            .entry(hook_type.into())
            .or_default()
            .push(listener);
    }

    /// Deliver `payload` to every listener of `hook_type`, in registration order.
    ///
    /// Returns the number of listeners called.
    pub fn publish(&self, hook_type: &str, payload: &Value) -> usize {
        // Listeners run outside the lock so they may register more listeners.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .get(hook_type)
            .cloned()
            .unwrap_or_default();

        for listener in &listeners {
            listener(payload);
        }

        tracing::debug!(
            hook_type = hook_type,
            delivered = listeners.len(),
            "Hook event published"
        );
        listeners.len()
    }

    /// Number of listeners registered for `hook_type`
    pub fn listener_count(&self, hook_type: &str) -> usize {
        self.listeners
            .read()
            .get(hook_type)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(hook_type, list)| (hook_type.as_str(), list.len()))
            .collect();
        f.debug_struct("HookRegistry")
            .field("listeners", &counts)
            .finish()
    }
}

/// Publishing handle bound to a single hook type
#[derive(Clone, Debug)]
pub struct HookPublisher {
    hook_type: String,
    registry: HookRegistry,
}

impl HookPublisher {
    /// Create a publisher for `hook_type`
    pub fn new(hook_type: impl Into<String>, registry: HookRegistry) -> Self {
        Self {
            hook_type: hook_type.into(),
            registry,
        }
    }

    /// Hook type this publisher reports for
    pub fn hook_type(&self) -> &str {
        &self.hook_type
    }

    /// Report a completion event
    pub fn publish(&self, payload: &Value) -> usize {
        self.registry.publish(&self.hook_type, payload)
    }
}
