//! Typed values carried in `http` request/response extensions
//!
//! The server glue and routers insert these; middlewares and extractors read
//! them.

use std::net::IpAddr;

/// Address of the connected peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub IpAddr);

/// Route that handled the request, e.g. `"GET /users/:id"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute(pub String);

impl MatchedRoute {
    /// Path pattern without the method prefix
    pub fn path(&self) -> &str {
        self.0.split(' ').last().unwrap_or_default()
    }
}

/// Extra `key:value` tags a handler attaches to a response for the stats
/// middleware
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsTags(pub Vec<String>);

/// Marks requests issued by a test harness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestRequest;
