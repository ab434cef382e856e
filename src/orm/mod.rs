//! Object layer contracts.
//!
//! # Data Flow
//! ```text
//! actions/ (validated, adapted fields)
//!     → ObjectStore::model (schema lookup)
//!     → ObjectStore::read / update / create / clone_objects
//!     → canonical values back to actions/ for adapt_out
//! ```
//!
//! # Design Decisions
//! - Actions depend on the `ObjectStore` trait only
//! - Storage errors are opaque to actions and propagate untouched
//! - `InMemoryStore` backs tests and embedders; no SQL engine here

pub mod memory;
pub mod schema;
pub mod store;

pub use memory::InMemoryStore;
pub use schema::{EntitySchema, FieldDescriptor};
pub use store::{ObjectStore, StoreError};
