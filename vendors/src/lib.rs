//! Search client implementations for esperf
//!
//! This crate provides implementations of the `SearchClient` trait for:
//!
//! - Elasticsearch (`POST /<index>/<type>/_search`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod elasticsearch;

pub use config::{ClientConfig, ConfigValidationError};
pub use elasticsearch::ElasticsearchClient;
