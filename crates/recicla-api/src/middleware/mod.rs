//! HTTP middleware
//!
//! The authorization gate lives in `crate::auth::middleware`; this module
//! holds the response-wide layers.

pub mod security_headers;

pub use security_headers::security_headers_middleware;
