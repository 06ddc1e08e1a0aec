//! Application layer services implementing the retrieval workflow.
//!
//! Services consume the grid source trait from the domain layer and expose a
//! clean API to HTTP handlers and the CLI.
//!
//! # Available Services
//!
//! - [`services::retrieval_service::RetrievalService`] - Acquire, extract, package and clean up

pub mod services;
