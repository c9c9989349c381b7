//! # Waystation Web
//!
//! The HTTP-facing half of the request lifecycle:
//! - Fixed-status response model ([`Response`])
//! - Mapping of domain errors onto responses ([`ErrorMapper`])
//! - Composable input extractors and validators
//! - The [`Web`] pipeline that writes handler results to the wire

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error_mapper;
pub mod extractors;
pub mod input_validator;
pub mod input_validators;
pub mod ip_address;
pub mod process;
pub mod raw_request;
pub mod responses;
pub mod schema_errors;

pub use error_mapper::{Converter, ErrorMapper};
pub use extractors::{
    extractor_fn, CoercionRules, CombinedInputExtractor, ConstantInput, Filter, HeadersExtractor,
    InputExtractor, ParamExtractor, RenameRules,
};
pub use input_validator::{InputValidator, Validation};
pub use input_validators::{AcceptHeader, ContentTypeHeader};
pub use process::{HandlerResult, Web};
pub use raw_request::RawRequest;
pub use responses::{
    to_accepted, to_created, to_no_content, to_ok, ErrorResponse, ErrorStatus, Response, Success,
    SuccessBody, SuccessStatus,
};
pub use schema_errors::UnprocessableEntityFromSchemaErrors;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error_mapper::ErrorMapper;
    pub use crate::extractors::{InputExtractor, ParamExtractor};
    pub use crate::input_validator::InputValidator;
    pub use crate::process::{HandlerResult, Web};
    pub use crate::raw_request::RawRequest;
    pub use crate::responses::{ErrorResponse, Response, Success};
}
