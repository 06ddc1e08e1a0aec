//! Domain layer containing retrieval entities and the grid source contract.
//!
//! # Architecture
//!
//! - [`entities`] - Request-scoped data structures
//! - [`sources`] - Grid source traits implemented by the infrastructure layer
//!
//! # Retrieval Flow
//!
//! 1. HTTP handler coerces the JSON body into a [`entities::RetrievalRequest`]
//! 2. [`crate::application::services::RetrievalService`] acquires, opens and
//!    extracts each variable through a [`sources::GridSource`]
//! 3. The extracted CSVs become a [`entities::DownloadPayload`]
//! 4. All files written for the request are deleted before the response leaves

pub mod entities;
pub mod sources;
