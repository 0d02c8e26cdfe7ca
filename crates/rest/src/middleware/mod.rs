//! HTTP middleware for the analytics API.
//!
//! - [`security_headers`] - Browser hardening headers on every response

pub mod security_headers;

pub use security_headers::security_headers_middleware;
