#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsv-core
//!
//! JSON pointers, kind classification, and value comparison primitives for
//! the JSON Schema validation engine.
//!
//! Instance documents are plain `serde_json::Value` trees, so this crate
//! carries only what the schema and validation crates share: RFC 6901
//! addressing, runtime kinds, and mathematical-value comparison of numbers.

/// Structural equality over JSON values.
pub mod equality;
/// Runtime kind classification for JSON values.
pub mod kind;
/// Comparison helpers over JSON numbers.
pub mod number;
/// RFC 6901 JSON pointer type.
pub mod pointer;

/// Structural equality entry point.
pub use equality::json_equal;
/// Kind classification primitives.
pub use kind::{JsonKind, is_integral};
/// Pointer type shared by schema locations and violation paths.
pub use pointer::JsonPointer;

use thiserror::Error;

/// Errors that can occur when working with JSON pointers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid JSON pointer '{pointer}': {reason}")]
    InvalidPointer { pointer: String, reason: String },
}

impl Error {
    /// Build an invalid-pointer error with input text and parsing reason.
    pub fn invalid_pointer(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPointer {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for pointer operations.
pub type Result<T> = std::result::Result<T, Error>;
