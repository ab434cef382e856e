//! HTTP message subsystem.
//!
//! # Data Flow
//! ```text
//! raw request bytes
//!     → request.rs (request line, header block)
//!     → headers.rs (case-insensitive collection)
//!     → message.rs (body decoded from Content-Type via body.rs,
//!                   multipart.rs, xml.rs; URI/Host kept in sync)
//!     → [business logic reads structured fields]
//!     → response.rs (status line, re-encoded body)
//!     → wire bytes
//! ```
//!
//! # Design Decisions
//! - Everything here is synchronous and allocation-local to one message
//! - Decoding problems degrade to the raw body, they never fail a request
//! - Lookup tables (status codes) are immutable statics

pub mod body;
pub mod headers;
pub mod message;
pub mod method;
pub mod multipart;
pub mod request;
pub mod response;
pub mod status;
pub mod uri;
pub mod xml;

pub use body::{Body, BodyDecoder};
pub use headers::{CookieParams, HttpHeaders};
pub use message::HttpMessage;
pub use method::HttpMethod;
pub use request::{HttpRequest, RequestParseError};
pub use response::HttpResponse;
pub use uri::HttpUri;
