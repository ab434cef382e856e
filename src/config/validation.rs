//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and well-known spellings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EqualConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::schema::EqualConfig;

/// A single semantic problem, keyed by its dotted config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &EqualConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let http = &config.http;
    if http.max_input_vars == 0 {
        errors.push(ValidationError::new("http.max_input_vars", "must be greater than 0"));
    }
    if !http.default_protocol.to_ascii_uppercase().starts_with("HTTP/") {
        errors.push(ValidationError::new(
            "http.default_protocol",
            format!("expected HTTP/<version>, got {:?}", http.default_protocol),
        ));
    }
    if !matches!(http.default_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "http.default_scheme",
            format!("expected http or https, got {:?}", http.default_scheme),
        ));
    }
    if http.max_body_size == 0 {
        errors.push(ValidationError::new("http.max_body_size", "must be greater than 0"));
    }

    let lang = &config.orm.default_lang;
    if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-') {
        errors.push(ValidationError::new(
            "orm.default_lang",
            format!("invalid language code {lang:?}"),
        ));
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("invalid filter {:?}", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
