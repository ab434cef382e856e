//! Adapter contract and adaptation error.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::error::ErrorCode;

/// Bidirectional value converter for one usage tag.
///
/// `adapt_in` converts from the adapter's outer format (JSON, SQL) to the
/// internal value; `adapt_out` goes the other way.
pub trait DataAdapter: Send + Sync + fmt::Debug {
    /// Registry key, e.g. `json/date.year`.
    fn usage(&self) -> &'static str;

    /// Primitive type expected on the decode side.
    fn cast_in_type(&self) -> &'static str;

    /// Type produced on the encode side, optionally refined by usage.
    fn cast_out_type(&self, usage: Option<&str>) -> &'static str;

    fn adapt_in(&self, value: &Value, usage: &str) -> Result<Value, AdaptError>;

    fn adapt_out(&self, value: &Value, usage: &str) -> Result<Value, AdaptError>;
}

/// A value the adapter cannot convert.
///
/// `message` is usually a string code (`invalid_integer`) but may be a
/// structured value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", display_message(.message))]
pub struct AdaptError {
    pub class: ErrorCode,
    pub message: Value,
}

impl AdaptError {
    pub fn new(class: ErrorCode, message: impl Into<Value>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn invalid(code: &str) -> Self {
        Self::new(ErrorCode::InvalidParam, code)
    }
}

fn display_message(message: &Value) -> String {
    match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
