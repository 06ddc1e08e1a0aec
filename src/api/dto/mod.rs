//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies are accepted as loose JSON and coerced into domain
//! entities; responses serialize with Serde.

pub mod download;
pub mod health;
pub mod variables;
