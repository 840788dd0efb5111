//! JSON encoding of value trees.

use crate::value::Value;
use thiserror::Error;

/// A response body that is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid JSON at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

pub fn parse(text: &str) -> Result<Value, ParseError> {
    Ok(serde_json::from_str(text)?)
}

/// Compact JSON text for `value`.
pub fn serialize(value: &Value) -> String {
    serde_json::Value::from(value).to_string()
}
