//! Data adaptation subsystem.
//!
//! # Data Flow
//! ```text
//! wire value (JSON, form text)
//!     → provider.rs resolve("json/<usage>")
//!     → DataAdapter::adapt_in → internal value → orm/
//! internal value
//!     → DataAdapter::adapt_out → wire value
//! ```
//!
//! # Design Decisions
//! - The registry is built once and never mutated
//! - Resolution never fails: unknown tags get the passthrough adapter
//! - `sql/*` adapters are picked per configured dbms

pub mod adapter;
pub mod adapters;
pub mod provider;

pub use adapter::{AdaptError, DataAdapter};
pub use provider::DataAdapterProvider;
