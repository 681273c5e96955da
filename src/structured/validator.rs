//! Schema conformance checks for extracted objects.
//!
//! Conformance is advisory: callers log non-conforming answers and still return them.

use crate::structured::error::{ValidationError, ValidationResult};
use crate::structured::schema::reasoning_step_schema;
use crate::{Error, ErrorContext, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Compiled JSON Schema validator.
pub struct OutputValidator {
    schema: JSONSchema,
}

impl OutputValidator {
    pub fn new(schema: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| {
                Error::validation_with_context(
                    format!("Failed to compile schema: {}", e),
                    ErrorContext::new().with_source("output_validator"),
                )
            })?;
        Ok(Self { schema })
    }

    /// Validator for the reasoning-step schema.
    pub fn reasoning() -> Result<Self> {
        Self::new(reasoning_step_schema())
    }

    pub fn validate(&self, data: &Value) -> ValidationResult {
        match self.schema.validate(data) {
            Ok(()) => ValidationResult::success(),
            Err(errors) => ValidationResult::failure(
                errors
                    .map(|e| ValidationError::with_path(e.to_string(), e.instance_path.to_string()))
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Debug for OutputValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputValidator").finish_non_exhaustive()
    }
}
