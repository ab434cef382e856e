//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every
//! section is optional; omitted keys fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::http::body::DEFAULT_MAX_INPUT_VARS;
use crate::http::message::DEFAULT_PROTOCOL;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EqualConfig {
    /// Message parsing limits and defaults.
    pub http: HttpConfig,

    /// Object layer settings.
    pub orm: OrmConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// HTTP message handling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Maximum number of variables kept when decoding a query string.
    pub max_input_vars: usize,

    /// Protocol assigned to messages whose headline omits one.
    pub default_protocol: String,

    /// Scheme used to resolve relative request targets.
    pub default_scheme: String,

    /// Largest body accepted by the wire parser, in bytes.
    pub max_body_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_input_vars: DEFAULT_MAX_INPUT_VARS,
            default_protocol: DEFAULT_PROTOCOL.to_string(),
            default_scheme: "http".to_string(),
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

/// Storage backend family, selects the `sql/*` adapters.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dbms {
    #[default]
    Mysql,
    Sqlite,
}

impl Dbms {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dbms::Mysql => "MYSQL",
            Dbms::Sqlite => "SQLITE",
        }
    }
}

/// Object layer settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OrmConfig {
    /// Language used when a request does not name one.
    pub default_lang: String,

    /// Storage backend.
    pub dbms: Dbms,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            default_lang: "en".to_string(),
            dbms: Dbms::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human readable or JSON lines.
    pub log_format: LogFormat,

    /// Install the Prometheus recorder.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            metrics_enabled: false,
        }
    }
}
