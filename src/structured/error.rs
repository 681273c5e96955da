//! Error types for structured output validation.

use std::fmt;

/// Validation error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error message describing what went wrong
    pub message: String,
    /// JSON pointer to the error location (e.g., "/reasoning_steps/0/title")
    pub path: Option<String>,
}

impl ValidationError {
    /// Create an error with a path.
    pub fn with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            message: message.into(),
            path: if path.is_empty() { None } else { Some(path) },
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validation operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    /// List of validation errors (empty if valid)
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if validation passed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get error messages as strings.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}
