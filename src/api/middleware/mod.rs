//! HTTP middleware for request processing.
//!
//! Provides observability, CORS and panic recovery.

pub mod cors;
pub mod panic;
pub mod tracing;
