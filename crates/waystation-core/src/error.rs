//! Infrastructure error types for Waystation
//!
//! Domain failures produced by handlers live in [`crate::app_error`]. The
//! variants here describe conditions the web layer itself cannot turn into a
//! well-formed response.

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for Waystation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A domain error reached the error mapper without a registered mapping.
    ///
    /// This is a programming error: a handler emitted an error type nobody
    /// told the mapper about.
    #[error("Undefined error class: {0}")]
    UndefinedErrorClass(String),

    /// Hook type was never registered on the owning App
    #[error("Unknown hook_type {0}")]
    UnknownHook(String),

    /// Request was created without a hook initializer
    #[error("Hooks are not configured for this request")]
    HooksNotConfigured,

    /// Hook failed to start its asynchronous process
    #[error("Hook '{hook}' failed: {message}")]
    Hook {
        /// Hook type
        hook: String,
        /// Error message
        message: String,
    },

    /// Invalid HTTP request
    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] http::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a hook error
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }
}
