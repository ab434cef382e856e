//! Error taxonomy shared by actions and the object layer.
//!
//! Every error carries a stable string code and a numeric class; the
//! transport maps the class to an HTTP status.

use std::fmt;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::data::AdaptError;
use crate::orm::StoreError;

/// Numeric error classes, bit-compatible with the framework's constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Unknown = -1,
    MissingParam = -2,
    InvalidParam = -4,
    Sql = -8,
    UnknownObject = -16,
    NotAllowed = -32,
    LockedObject = -64,
    ConflictObject = -128,
    InvalidUser = -256,
    UnknownService = -512,
    InvalidConfig = -1024,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "UNKNOWN_ERROR",
            ErrorCode::MissingParam => "MISSING_PARAM",
            ErrorCode::InvalidParam => "INVALID_PARAM",
            ErrorCode::Sql => "SQL_ERROR",
            ErrorCode::UnknownObject => "UNKNOWN_OBJECT",
            ErrorCode::NotAllowed => "NOT_ALLOWED",
            ErrorCode::LockedObject => "LOCKED_OBJECT",
            ErrorCode::ConflictObject => "CONFLICT_OBJECT",
            ErrorCode::InvalidUser => "INVALID_USER",
            ErrorCode::UnknownService => "UNKNOWN_SERVICE",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
        }
    }

    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::MissingParam | ErrorCode::InvalidParam => 400,
            ErrorCode::UnknownObject => 404,
            ErrorCode::NotAllowed => 403,
            ErrorCode::ConflictObject => 409,
            _ => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[derive(Debug, Error)]
pub enum EqualError {
    /// A required parameter was not supplied.
    #[error("missing parameter: {0}")]
    MissingParam(String),

    /// A parameter is present but unusable; carries the error code.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("unknown object: {0}")]
    UnknownObject(String),

    /// Concurrent modification detected.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// Per-field failures, keyed by field name.
    #[error("field errors ({}): {}", .class.name(), Value::Object(.errors.clone()))]
    FieldErrors {
        class: ErrorCode,
        errors: Map<String, Value>,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The response could not be written to its sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EqualError {
    /// Wrap an adapter failure for `field`, keeping its class.
    pub fn field(field: &str, err: AdaptError) -> Self {
        let mut errors = Map::new();
        errors.insert(field.to_string(), err.message);
        EqualError::FieldErrors {
            class: err.class,
            errors,
        }
    }

    pub fn class(&self) -> ErrorCode {
        match self {
            EqualError::MissingParam(_) => ErrorCode::MissingParam,
            EqualError::InvalidParam(_) => ErrorCode::InvalidParam,
            EqualError::UnknownObject(_) => ErrorCode::UnknownObject,
            EqualError::Conflict(_) => ErrorCode::ConflictObject,
            EqualError::NotAllowed(_) => ErrorCode::NotAllowed,
            EqualError::FieldErrors { class, .. } => *class,
            EqualError::Storage(err) => err.class(),
            EqualError::Io(_) => ErrorCode::Unknown,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.class().http_status()
    }

    /// Wire payload: `{"errors": {"<CLASS>": <message>}}`.
    pub fn to_body(&self) -> Value {
        let message = match self {
            EqualError::MissingParam(m)
            | EqualError::InvalidParam(m)
            | EqualError::UnknownObject(m)
            | EqualError::Conflict(m)
            | EqualError::NotAllowed(m) => Value::String(m.clone()),
            EqualError::FieldErrors { errors, .. } => Value::Object(errors.clone()),
            EqualError::Storage(err) => err.message(),
            EqualError::Io(err) => Value::String(err.to_string()),
        };
        let mut errors = Map::new();
        errors.insert(self.class().name().to_string(), message);
        json!({ "errors": errors })
    }
}
