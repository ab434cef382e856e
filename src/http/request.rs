//! Inbound requests.
//!
//! # Responsibilities
//! - Parse the request line (`METHOD TARGET PROTOCOL`)
//! - Resolve relative targets against the `Host` header
//! - Parse a complete wire message (request line, header block, body)
//!
//! # Design Decisions
//! - The base message is built first (headers, decoded body, defaults); the
//!   request line is applied afterwards so the URI query merges into an
//!   already decoded body
//! - `Content-Length` trims trailing bytes but never pads

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::config::HttpConfig;
use crate::http::body::{parse_query, Body, BodyDecoder};
use crate::http::headers::HttpHeaders;
use crate::http::message::HttpMessage;

/// Errors raised while reading a request off the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestParseError {
    /// Nothing but whitespace was received.
    #[error("empty request")]
    Empty,

    /// A header line without a `name: value` shape.
    #[error("malformed header line: {0}")]
    MalformedHeader(String),

    /// The body exceeds the configured limit.
    #[error("body of {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    message: HttpMessage,
}

impl HttpRequest {
    pub fn new(headline: &str, headers: HttpHeaders, body: impl Into<Body>) -> Self {
        Self::with_config(headline, headers, body, &HttpConfig::default())
    }

    pub fn with_config(
        headline: &str,
        headers: HttpHeaders,
        body: impl Into<Body>,
        config: &HttpConfig,
    ) -> Self {
        let mut message = HttpMessage::with_decoder(headers, body, BodyDecoder::from(config));
        message.set_protocol(&config.default_protocol);
        let mut request = Self { message };
        request.apply_headline(headline, &config.default_scheme);
        request
    }

    /// Parse a complete request as received.
    pub fn parse(raw: &str) -> Result<Self, RequestParseError> {
        Self::parse_with_config(raw, &HttpConfig::default())
    }

    pub fn parse_with_config(raw: &str, config: &HttpConfig) -> Result<Self, RequestParseError> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            return Err(RequestParseError::Empty);
        }

        let (head, body) = split_head(raw);
        let mut lines = head.lines();
        let headline = lines.next().unwrap_or_default().trim();

        let mut headers = HttpHeaders::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| RequestParseError::MalformedHeader(line.to_string()))?;
            if name.trim().is_empty() {
                return Err(RequestParseError::MalformedHeader(line.to_string()));
            }
            headers.append(name.trim(), value.trim());
        }

        let mut body = body;
        if let Some(length) = headers.get("Content-Length").and_then(|v| v.trim().parse::<usize>().ok()) {
            if length < body.len() && body.is_char_boundary(length) {
                body = &body[..length];
            }
        }
        if body.len() > config.max_body_size {
            return Err(RequestParseError::BodyTooLarge {
                size: body.len(),
                limit: config.max_body_size,
            });
        }

        let request = Self::with_config(headline, headers, body, config);
        tracing::debug!(
            method = %request.method(),
            uri = %request.uri_string(),
            content_type = ?request.content_type(),
            "Request parsed"
        );
        Ok(request)
    }

    fn apply_headline(&mut self, headline: &str, default_scheme: &str) {
        let mut tokens = headline.split_whitespace().peekable();

        if let Some(first) = tokens.peek() {
            if first.parse::<crate::http::HttpMethod>().is_ok() {
                self.message.set_method(first);
                tokens.next();
            }
        }
        let target = tokens.next();
        if let Some(protocol) = tokens.next() {
            self.message.set_protocol(protocol);
        }

        let Some(target) = target else {
            return;
        };
        if target.contains("://") {
            self.message.set_uri(target);
        } else if target.starts_with('/') {
            match self.message.header("Host").map(str::to_string) {
                Some(host) => {
                    self.message.set_uri(&format!("{default_scheme}://{host}{target}"));
                }
                None => {
                    // no authority to build a URI from: keep the query parameters
                    if let Some((_, query)) = target.split_once('?') {
                        let query = query.split('#').next().unwrap_or_default();
                        let params = parse_query(query, self.message.decoder().max_input_vars());
                        self.message.extend_body(Body::from(params));
                    }
                }
            }
        }
    }

    /// Request target for the request line: path and query.
    pub fn target(&self) -> String {
        let uri = self.message.uri();
        let mut target = uri.path().unwrap_or("/").to_string();
        if let Some(query) = uri.query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    pub fn to_wire(&self) -> String {
        let headline = format!("{} {} {}", self.method(), self.target(), self.protocol());
        self.message.render(&headline)
    }

    pub fn into_message(self) -> HttpMessage {
        self.message
    }
}

fn split_head(raw: &str) -> (&str, &str) {
    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let lf = raw.find("\n\n").map(|i| (i, 2));
    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };
    match split {
        Some((i, len)) => (&raw[..i], &raw[i + len..]),
        None => (raw, ""),
    }
}

impl Deref for HttpRequest {
    type Target = HttpMessage;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl DerefMut for HttpRequest {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}
