//! Outbound responses.
//!
//! # Responsibilities
//! - Parse the status line (`PROTOCOL CODE [REASON]`)
//! - Serialize status line, headers and encoded body for the wire
//!
//! # Design Decisions
//! - A response without status goes out as `200 OK`
//! - `Content-Length` is always recomputed from the encoded body

use std::ops::{Deref, DerefMut};

use crate::config::HttpConfig;
use crate::http::body::{Body, BodyDecoder};
use crate::http::headers::HttpHeaders;
use crate::http::message::HttpMessage;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    message: HttpMessage,
}

impl HttpResponse {
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

        let headline = headline.trim();
        match headline.split_once(' ') {
            Some((protocol, status)) if protocol.to_ascii_uppercase().starts_with("HTTP/") => {
                message.set_protocol(protocol);
                message.set_status(status);
            }
            _ if headline.to_ascii_uppercase().starts_with("HTTP/") => {
                message.set_protocol(headline);
            }
            _ if !headline.is_empty() => {
                message.set_status(headline);
            }
            _ => {}
        }
        Self { message }
    }

    pub fn status_line(&self) -> String {
        format!("{} {}", self.protocol(), self.status().unwrap_or("200 OK"))
    }

    pub fn to_wire(&self) -> String {
        self.message.render(&self.status_line())
    }

    pub fn into_message(self) -> HttpMessage {
        self.message
    }
}

impl Deref for HttpResponse {
    type Target = HttpMessage;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl DerefMut for HttpResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}
