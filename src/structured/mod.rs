//! Structured output: response schemas, JSON extraction, and conformance checks.
//!
//! - [`ResponseFormat`]: the response-schema descriptor sent in schema mode
//! - [`extract`]: locate the JSON object in model text
//! - [`OutputValidator`]: check an object against a JSON schema
//!
//! # Examples
//!
//! ```
//! use cot_reasoner::structured::{extract, OutputValidator};
//!
//! let text = "Sure!\n```json\n{\"reasoning_steps\": [], \"final_answer\": \"4\"}\n```";
//! let object = extract(text).unwrap();
//! assert_eq!(object["final_answer"], "4");
//!
//! let validator = OutputValidator::reasoning().unwrap();
//! assert!(validator.validate(&serde_json::Value::Object(object)).is_valid());
//! ```

pub mod error;
pub mod extract;
pub mod json_mode;
pub mod schema;
pub mod validator;

pub use error::{ValidationError, ValidationResult};
pub use extract::{extract, ExtractError};
pub use json_mode::ResponseFormat;
pub use schema::{reasoning_step_schema, schema_from_type_name, SchemaGenerator};
pub use validator::OutputValidator;
