//! Controller actions.
//!
//! # Data Flow
//! ```text
//! HttpRequest
//!     → announce.rs (declared params extracted and coerced)
//!     → <action>.rs (business rules over ObjectStore + DataAdapterProvider)
//!     → context.rs (HttpResponse status + body → send to sink)
//! ```
//!
//! # Design Decisions
//! - The context is the only way out: actions never write to the sink
//! - Errors propagate to the caller, which renders them with
//!   `Context::send_error`

pub mod announce;
pub mod clone;
pub mod context;
pub mod update;

pub use announce::{announce, Announcement, ParamSpec, ParamType, ResponseSpec};
pub use context::Context;
