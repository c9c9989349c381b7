//! # Waystation Core
//!
//! Core types, traits, and error handling shared by the Waystation crates.
//!
//! This crate provides the application-side half of the request lifecycle:
//! - Domain error taxonomy ([`AppError`])
//! - Requests flowing through handler chains ([`AppRequest`])
//! - The [`App`] container and its asynchronous hooks
//! - Input verification against a schema
//! - The middleware trait and chain
//! - Infrastructure error types

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod app;
pub mod app_error;
pub mod error;
pub mod extensions;
pub mod hooks;
pub mod input;
pub mod middleware;
pub mod request;
pub mod result_helper;
pub mod verification;

pub use app::{App, ImmediateHook};
pub use app_error::{AppError, CustomError, ErrorDetails, ErrorKind, InvalidInput};
pub use error::{Error, Result};
pub use extensions::{MatchedRoute, RemoteAddr, StatsTags, TestRequest};
pub use hooks::{Hook, HookPublisher, HookRegistry, Listener};
pub use input::{merge_input, FieldErrors, Input};
pub use middleware::{handler_fn, Body, Chain, HandlerFn, Middleware, Next};
pub use request::{AppRequest, HookInitializer};
pub use verification::{verify_input, Schema, SchemaOutcome};

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Method, Request, Response, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::App;
    pub use crate::app_error::{AppError, ErrorDetails, ErrorKind, InvalidInput};
    pub use crate::error::{Error, Result};
    pub use crate::input::{FieldErrors, Input};
    pub use crate::middleware::{Body, Middleware, Next};
    pub use crate::request::AppRequest;
    pub use crate::result_helper::{empty_success_response, observe};
}
