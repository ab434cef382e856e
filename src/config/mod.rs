//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EqualConfig (validated, immutable)
//!     → HttpConfig feeds message decoding, OrmConfig the adapter registry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{Dbms, EqualConfig, HttpConfig, LogFormat, ObservabilityConfig, OrmConfig};
pub use validation::{validate_config, ValidationError};
