//! Sandboxed calculator.
//!
//! [`evaluate`] never fails past its boundary: unsafe input, syntax errors and
//! arithmetic errors all come back as [`Evaluation::Error`].
//!
//! Safety policy:
//! 1. A case-insensitive blacklist rejects import syntax, dynamic execution primitives,
//!    dunder names, anonymous functions, reflection accessors and file opening.
//! 2. The tokenizer accepts only numbers, whitespace, identifiers, the operators
//!    `+ - * / // % ** < > <= >= == != & | ^ ~ << >>`, parentheses, comma and period.
//! 3. Every call must name an allow-listed [`Function`]; the only free names are `pi`
//!    and `e`. There is no other name resolution.
//!
//! ```
//! use cot_reasoner::tools::calculator::{evaluate, CalcValue, Evaluation};
//!
//! assert_eq!(evaluate("sqrt(144) + 25"), Evaluation::Value(CalcValue::Float(37.0)));
//! assert!(evaluate("__import__('os')").is_error());
//! ```

mod lexer;
mod parser;
mod value;

pub use value::{CalcValue, Function};

use lexer::Token;
use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

pub const UNSAFE_EXPRESSION: &str = "invalid or unsafe expression";

static BLACKLIST: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)import\s+",
        r"(?i)exec\s*\(",
        r"(?i)eval\s*\(",
        r"(?i)compile\s*\(",
        r"(?i)__\w+__",
        r"(?i)lambda\s+",
        r"(?i)globals\s*\(",
        r"(?i)locals\s*\(",
        r"(?i)getattr\s*\(",
        r"(?i)setattr\s*\(",
        r"(?i)delattr\s*\(",
        r"(?i)open\s*\(",
    ])
    .expect("blacklist patterns are valid")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("{}", UNSAFE_EXPRESSION)]
    Unsafe,

    #[error("invalid syntax: {0}")]
    Syntax(String),

    #[error("{0}")]
    Name(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Value(String),

    #[error("{0}")]
    ZeroDivision(String),

    #[error("{0}")]
    Domain(String),

    #[error("{0}")]
    Overflow(String),
}

/// Outcome of evaluating one expression.
///
/// Serializes to `{"result": <number>}` or `{"error": <message>}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Value(CalcValue),
    Error(String),
}

impl Evaluation {
    pub fn is_error(&self) -> bool {
        matches!(self, Evaluation::Error(_))
    }

    pub fn value(&self) -> Option<&CalcValue> {
        match self {
            Evaluation::Value(v) => Some(v),
            Evaluation::Error(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Evaluation::Value(v) => serde_json::json!({ "result": v }),
            Evaluation::Error(e) => serde_json::json!({ "error": e }),
        }
    }
}

impl From<CalculationError> for Evaluation {
    fn from(err: CalculationError) -> Self {
        match err {
            CalculationError::Unsafe => Evaluation::Error(UNSAFE_EXPRESSION.to_string()),
            other => Evaluation::Error(format!("calculation error: {}", other)),
        }
    }
}

impl Serialize for Evaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Evaluation::Value(v) => map.serialize_entry("result", v)?,
            Evaluation::Error(e) => map.serialize_entry("error", e)?,
        }
        map.end()
    }
}

/// Run the blacklist, then the token allow-list, without evaluating anything.
pub fn check_expression(expression: &str) -> Result<(), CalculationError> {
    screen(expression.trim()).map(|_| ())
}

fn screen(expression: &str) -> Result<Vec<Token>, CalculationError> {
    if BLACKLIST.is_match(expression) {
        return Err(CalculationError::Unsafe);
    }
    let tokens = lexer::tokenize(expression)?;
    let unknown_call = tokens.windows(2).any(|pair| match pair {
        [Token::Ident(name), Token::LParen] => Function::lookup(name).is_none(),
        _ => false,
    });
    if unknown_call {
        return Err(CalculationError::Unsafe);
    }
    Ok(tokens)
}

fn run(expression: &str) -> Result<CalcValue, CalculationError> {
    let tokens = screen(expression)?;
    let expr = parser::parse(&tokens)?;
    let value = parser::eval(&expr)?;
    if !value.is_finite() {
        return Err(CalculationError::Overflow(
            "numerical result out of range".into(),
        ));
    }
    Ok(value)
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Evaluation {
    let expression = expression.trim();
    debug!(expression, "Calculating expression");
    match run(expression) {
        Ok(value) => {
            debug!(?value, "Calculation result");
            Evaluation::Value(value)
        }
        Err(err) => {
            warn!(expression, error = %err, "Calculation failed");
            err.into()
        }
    }
}
