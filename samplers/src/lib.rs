//! Request samplers for esperf
//!
//! This crate provides implementations of the `Sampler` trait:
//!
//! - [`TemplateSampler`]: picks a condition at random and fills in its
//!   `$key` placeholders from a substitution set

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod template;

pub use template::{substitute, TemplateSampler, PLACEHOLDER_PREFIX};
