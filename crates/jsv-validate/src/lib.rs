#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsv-validate
//!
//! Validation engine producing keyword-level violation reports.
//!
//! This crate walks a loaded schema alongside a JSON instance and records a
//! [`Violation`] for every keyword the instance fails, each carrying the
//! instance path and schema path involved.
//!
//! ## Example Usage
//!
//! ```rust
//! use jsv_schema::SchemaLoader;
//! use jsv_validate::ValidationEngine;
//! use serde_json::json;
//!
//! // Load a self-contained schema
//! let loader = SchemaLoader::new();
//! let schema = loader
//!     .load_value(&json!({
//!         "type": "object",
//!         "properties": {"count": {"type": "integer", "minimum": 0}},
//!         "required": ["count"]
//!     }))
//!     .unwrap();
//!
//! // Validate instances against it
//! let engine = ValidationEngine::new();
//! let report = engine.validate(&schema, &json!({"count": 3})).unwrap();
//! assert!(report.is_valid());
//!
//! let report = engine.validate(&schema, &json!({"count": -1})).unwrap();
//! assert_eq!(report.violations()[0].keyword, "minimum");
//! ```

pub mod engine;
pub mod formats;
pub mod reporter;
pub mod rules;

// Re-export main types
pub use engine::{ValidationConfig, ValidationEngine};
pub use formats::{FormatCheck, FormatRegistry};
pub use reporter::{Violation, ViolationReport};
pub use rules::{
    RuleResult, validate_const, validate_enum, validate_exclusive_maximum,
    validate_exclusive_minimum, validate_max_items, validate_max_length, validate_max_properties,
    validate_maximum, validate_min_items, validate_min_length, validate_min_properties,
    validate_minimum, validate_multiple_of, validate_pattern, validate_type, validate_unique_items,
};

use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Reference failed to resolve during validation: {0}")]
    UnresolvedReference(#[from] jsv_schema::ResolutionError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to validate an instance with default settings
///
/// # Errors
///
/// Returns an error when a schema reference fails to resolve.
pub fn validate(
    schema: &jsv_schema::Schema,
    instance: &serde_json::Value,
) -> Result<ViolationReport> {
    let engine = ValidationEngine::new();
    engine.validate(schema, instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convenience_validate() {
        let schema = jsv_schema::SchemaLoader::new()
            .load_value(&json!({"type": "array"}))
            .unwrap();

        assert!(validate(&schema, &json!([1, 2])).unwrap().is_valid());
        assert!(!validate(&schema, &json!("nope")).unwrap().is_valid());
    }
}
