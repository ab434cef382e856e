//! HTTP message model and controller core.
//!
//! # Architecture Overview
//!
//! ```text
//!   raw request ──▶ http::request ──▶ http::message ──▶ actions::announce
//!                   (headline,        (headers, URI,     (declared params)
//!                    header block)     decoded body)             │
//!                                                                ▼
//!                                          data::provider ◀── actions::update
//!                                          (usage adapters)   actions::clone
//!                                                                │
//!                                                                ▼
//!                                                           orm::ObjectStore
//!                                                                │
//!   wire bytes ◀── http::response ◀── actions::context ◀─────────┘
//!
//!   cross-cutting: config (TOML), observability (tracing, metrics), error
//! ```

pub mod actions;
pub mod config;
pub mod data;
pub mod error;
pub mod http;
pub mod observability;
pub mod orm;

pub use config::EqualConfig;
pub use error::{EqualError, ErrorCode};
pub use http::{Body, HttpMessage, HttpRequest, HttpResponse};
