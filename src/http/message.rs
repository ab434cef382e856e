//! HTTP message shared by requests and responses.
//!
//! # Responsibilities
//! - Hold method, protocol, status, URI, headers and body
//! - Decode the body from its raw form based on `Content-Type`
//! - Keep the `Host` header and the URI authority in sync
//! - Merge URI query parameters into the body
//!
//! # Design Decisions
//! - Construction order is fixed: status, headers, body, protocol, method,
//!   URI. The body decoder needs the headers; the URI needs the body
//! - `raw_body` is always the last argument given to `set_body`, never a
//!   re-encoding of `body`
//! - Setters return `&mut Self` so calls chain; invalid input is ignored
//!   rather than reported (a rejected method keeps the previous one)
//! - No direct mutable access to the URI or headers: every edit goes through
//!   a setter that maintains the Host/authority invariant

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::http::body::{parse_query, scalar_to_string, Body, BodyDecoder};
use crate::http::headers::{CookieParams, HttpHeaders};
use crate::http::method::HttpMethod;
use crate::http::status::{parse_status_code, status_line};
use crate::http::uri::HttpUri;

pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

#[derive(Debug, Clone, PartialEq)]
pub struct HttpMessage {
    method: HttpMethod,
    protocol: String,
    uri: HttpUri,
    headers: HttpHeaders,
    status: Option<String>,
    body: Body,
    raw_body: Body,
    decoder: BodyDecoder,
}

impl Default for HttpMessage {
    fn default() -> Self {
        Self::new(HttpHeaders::new(), Body::default())
    }
}

impl HttpMessage {
    pub fn new(headers: HttpHeaders, body: impl Into<Body>) -> Self {
        Self::with_decoder(headers, body, BodyDecoder::default())
    }

    pub fn with_decoder(headers: HttpHeaders, body: impl Into<Body>, decoder: BodyDecoder) -> Self {
        let mut message = Self {
            method: HttpMethod::Get,
            protocol: DEFAULT_PROTOCOL.to_string(),
            uri: HttpUri::default(),
            headers: HttpHeaders::new(),
            status: None,
            body: Body::default(),
            raw_body: Body::default(),
            decoder,
        };
        message.set_headers(headers);
        message.set_body(body);
        message.set_protocol(DEFAULT_PROTOCOL);
        message.set_method(HttpMethod::Get.as_str());
        message.set_uri("");
        message
    }

    // --- Method & protocol ---

    /// Case-insensitive; unknown methods leave the current one in place.
    pub fn set_method(&mut self, method: &str) -> &mut Self {
        match method.parse::<HttpMethod>() {
            Ok(m) => self.method = m,
            Err(e) => tracing::debug!(error = %e, current = %self.method, "method rejected"),
        }
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn set_protocol(&mut self, protocol: &str) -> &mut Self {
        self.protocol = protocol.trim().to_string();
        self
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Version number after the `/` (`1.1` for `HTTP/1.1`), `0.0` if absent.
    pub fn protocol_version(&self) -> f32 {
        self.protocol
            .split_once('/')
            .and_then(|(_, v)| v.trim().parse().ok())
            .unwrap_or(0.0)
    }

    // --- Status ---

    /// Accepts a bare code (`"404"`, expanded with its reason phrase) or a
    /// full status line, stored verbatim.
    pub fn set_status(&mut self, status: &str) -> &mut Self {
        let status = status.trim();
        match status.parse::<u16>() {
            Ok(code) => self.set_status_code(code),
            Err(_) => {
                self.status = Some(status.to_string());
                self
            }
        }
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        self.status = Some(status_line(code));
        self
    }

    pub fn clear_status(&mut self) -> &mut Self {
        self.status = None;
        self
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Leading number of the status line; `0` when no status is set.
    pub fn status_code(&self) -> u16 {
        self.status.as_deref().map(parse_status_code).unwrap_or(0)
    }

    // --- URI ---

    /// Replace the URI.
    ///
    /// A URI authority overwrites the `Host` header; a URI without host takes
    /// it from an existing `Host` header. Query parameters are merged into
    /// the body.
    pub fn set_uri(&mut self, uri: &str) -> &mut Self {
        self.uri = HttpUri::parse(uri);

        match self.uri.authority() {
            Some(authority) => {
                self.headers.set("Host", authority);
            }
            None => {
                if let Some(host) = self.headers.get("Host").map(str::to_string) {
                    self.uri.set_authority(&host);
                }
            }
        }

        if let Some(query) = self.uri.query().map(str::to_string) {
            let params = parse_query(&query, self.decoder.max_input_vars());
            self.extend_body(Body::Structured(Value::Object(params)));
        }
        self
    }

    pub fn uri(&self) -> &HttpUri {
        &self.uri
    }

    pub fn uri_string(&self) -> String {
        self.uri.to_string()
    }

    // --- Headers ---

    pub fn set_headers(&mut self, headers: HttpHeaders) -> &mut Self {
        self.headers = headers;
        if let Some(host) = self.headers.get("Host").map(str::to_string) {
            self.uri.set_authority(&host);
        }
        self
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.set(name, value);
        if name.trim().eq_ignore_ascii_case("host") {
            self.uri.set_authority(value);
        }
        self
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn headers_map(&self) -> IndexMap<String, String> {
        self.headers.to_map()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.headers.get_or(name, default)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str, params: Option<&CookieParams>) -> &mut Self {
        self.headers.set_cookie(name, value, params);
        self
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers.get_cookie(name)
    }

    pub fn set_charset(&mut self, charset: &str) -> &mut Self {
        self.headers.set_charset(charset);
        self
    }

    pub fn charset(&self) -> Option<String> {
        self.headers.get_charset()
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.headers.set_content_type(content_type);
        self
    }

    pub fn content_type(&self) -> Option<String> {
        self.headers.get_content_type()
    }

    /// True for requests sent with `X-Requested-With: XMLHttpRequest`.
    pub fn is_xhr(&self) -> bool {
        self.headers.get("X-Requested-With") == Some("XMLHttpRequest")
    }

    // --- Body ---

    /// Store `body` and try to decode it from the current `Content-Type`.
    pub fn set_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.store_body(body.into(), false)
    }

    /// Store `body` without attempting any decoding.
    pub fn set_body_raw(&mut self, body: impl Into<Body>) -> &mut Self {
        self.store_body(body.into(), true)
    }

    fn store_body(&mut self, body: Body, raw: bool) -> &mut Self {
        self.raw_body = body.clone();
        self.body = match body {
            Body::Raw(payload) if !raw => self.decoder.decode(&payload, &self.headers),
            other => other,
        };
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn raw_body(&self) -> &Body {
        &self.raw_body
    }

    /// Merge parameters into the body.
    ///
    /// Mappings merge key by key (new values win) into a non-empty
    /// structured body and replace anything else. Scalars are appended to a
    /// structured body or concatenated to a raw one.
    pub fn extend_body(&mut self, params: Body) -> &mut Self {
        let current = std::mem::take(&mut self.body);
        self.body = match params {
            Body::Structured(p @ (Value::Object(_) | Value::Array(_))) => match current {
                Body::Structured(b) if is_non_empty_collection(&b) => Body::Structured(merge(b, p)),
                _ => Body::Structured(p),
            },
            scalar => {
                let text = match &scalar {
                    Body::Raw(s) => s.clone(),
                    Body::Structured(v) => scalar_to_string(v).unwrap_or_default(),
                };
                match current {
                    Body::Structured(b @ (Value::Object(_) | Value::Array(_))) => {
                        Body::Structured(merge(b, Value::Array(vec![Value::String(text)])))
                    }
                    Body::Structured(v) => {
                        Body::Raw(scalar_to_string(&v).unwrap_or_default() + &text)
                    }
                    Body::Raw(mut s) => {
                        s.push_str(&text);
                        Body::Raw(s)
                    }
                }
            }
        };
        self
    }

    /// Body parameter `param`; `None` for raw bodies, missing or null values.
    pub fn get(&self, param: &str) -> Option<&Value> {
        self.body.as_map()?.get(param).filter(|v| !v.is_null())
    }

    pub fn get_or(&self, param: &str, default: Value) -> Value {
        self.get(param).cloned().unwrap_or(default)
    }

    /// Several parameters at once; missing ones map to `null`.
    pub fn get_many(&self, params: &[&str]) -> Map<String, Value> {
        params
            .iter()
            .map(|p| (p.to_string(), self.get(p).cloned().unwrap_or(Value::Null)))
            .collect()
    }

    /// Assign a body parameter, discarding a raw body first.
    pub fn set(&mut self, param: &str, value: Value) -> &mut Self {
        self.ensure_map().insert(param.to_string(), value);
        self
    }

    pub fn set_many(&mut self, params: Map<String, Value>) -> &mut Self {
        let map = self.ensure_map();
        for (k, v) in params {
            map.insert(k, v);
        }
        self
    }

    pub fn del(&mut self, param: &str) -> &mut Self {
        if let Some(map) = self.body.as_map_mut() {
            map.shift_remove(param);
        }
        self
    }

    pub fn del_many(&mut self, params: &[&str]) -> &mut Self {
        for p in params {
            self.del(p);
        }
        self
    }

    fn ensure_map(&mut self) -> &mut Map<String, Value> {
        if self.body.as_map().is_none() {
            self.body = Body::Structured(Value::Object(Map::new()));
        }
        match &mut self.body {
            Body::Structured(Value::Object(map)) => map,
            _ => unreachable!("body was just made a mapping"),
        }
    }

    pub(crate) fn decoder(&self) -> BodyDecoder {
        self.decoder
    }

    /// Header block and encoded body, after a caller-supplied first line.
    pub(crate) fn render(&self, headline: &str) -> String {
        let payload = self.body.encode(self.content_type().as_deref());
        let mut out = String::with_capacity(payload.len() + 256);
        out.push_str(headline);
        out.push_str("\r\n");
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        if !payload.is_empty() {
            out.push_str(&format!("Content-Length: {}\r\n", payload.len()));
        }
        out.push_str("\r\n");
        out.push_str(&payload);
        out
    }
}

fn is_non_empty_collection(value: &Value) -> bool {
    match value {
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        _ => false,
    }
}

/// Merge two collections the way PHP's `array_merge` does: named keys are
/// overwritten, positional entries of both sides are renumbered from zero.
fn merge(base: Value, extra: Value) -> Value {
    match (base, extra) {
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        (base, extra) => {
            let mut map = Map::new();
            let mut next = 0u64;
            for (k, v) in into_map(base).into_iter().chain(into_map(extra)) {
                if k.parse::<u64>().is_ok() {
                    map.insert(next.to_string(), v);
                    next += 1;
                } else {
                    map.insert(k, v);
                }
            }
            Value::Object(map)
        }
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(m) => m,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => {
            let mut m = Map::new();
            m.insert("0".to_string(), other);
            m
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_headers() -> HttpHeaders {
        HttpHeaders::from_pairs([("Content-Type", "application/json")])
    }

    #[test]
    fn test_defaults() {
        let msg = HttpMessage::default();
        assert_eq!(msg.method(), HttpMethod::Get);
        assert_eq!(msg.protocol(), "HTTP/1.1");
        assert_eq!(msg.protocol_version(), 1.1);
        assert_eq!(msg.status(), None);
        assert_eq!(msg.status_code(), 0);
        assert!(msg.uri().is_empty());
    }

    #[test]
    fn test_method_rejection_keeps_previous() {
        let mut msg = HttpMessage::default();
        msg.set_method("post");
        assert_eq!(msg.method(), HttpMethod::Post);
        msg.set_method("FETCH");
        assert_eq!(msg.method(), HttpMethod::Post);
    }

    #[test]
    fn test_status_forms() {
        let mut msg = HttpMessage::default();
        msg.set_status("404");
        assert_eq!(msg.status(), Some("404 Not Found"));
        msg.set_status("299");
        assert_eq!(msg.status(), Some("299"));
        msg.set_status("200 Everything Fine");
        assert_eq!(msg.status(), Some("200 Everything Fine"));
        assert_eq!(msg.status_code(), 200);
    }

    #[test]
    fn test_uri_sets_host_header() {
        let mut msg = HttpMessage::default();
        msg.set_uri("http://example.com:8080/path");
        assert_eq!(msg.header("Host"), Some("example.com:8080"));

        msg.set_uri("http://example.com:80/a");
        assert_eq!(msg.header("Host"), Some("example.com:80"));
        assert_eq!(msg.uri_string(), "http://example.com:80/a");
    }

    #[test]
    fn test_merge_renumbers_positional_keys() {
        let base = json!({"5": "a", "name": "x", "9": "b"});
        let extra = json!({"3": "c", "name": "y"});
        assert_eq!(
            merge(base, extra),
            json!({"0": "a", "name": "y", "1": "b", "2": "c"})
        );
    }

    #[test]
    fn test_host_header_sets_uri() {
        let mut msg = HttpMessage::default();
        msg.set_uri("http://example.com/path");
        msg.set_header("host", "foo.test");
        assert_eq!(msg.uri().host(), Some("foo.test"));
        assert_eq!(msg.uri_string(), "http://foo.test/path");
    }

    #[test]
    fn test_query_merged_into_body() {
        let mut msg = HttpMessage::new(json_headers(), r#"{"a": "body", "keep": 1}"#);
        msg.set_uri("http://example.com/?a=query&b=2");
        assert_eq!(msg.get("a"), Some(&json!("query")));
        assert_eq!(msg.get("b"), Some(&json!("2")));
        assert_eq!(msg.get("keep").and_then(Value::as_i64), Some(1));
        // raw body untouched by the merge
        assert_eq!(msg.raw_body(), &Body::from(r#"{"a": "body", "keep": 1}"#));
    }

    #[test]
    fn test_query_replaces_raw_body() {
        let mut msg = HttpMessage::new(HttpHeaders::new(), "plain text");
        msg.set_uri("http://example.com/?x=1");
        assert_eq!(msg.body(), &Body::Structured(json!({"x": "1"})));
    }

    #[test]
    fn test_extend_scalar() {
        let mut msg = HttpMessage::new(HttpHeaders::new(), "abc");
        msg.extend_body(Body::from("def"));
        assert_eq!(msg.body(), &Body::from("abcdef"));

        let mut msg = HttpMessage::new(json_headers(), r#"{"k": "v"}"#);
        msg.extend_body(Body::from("tail"));
        assert_eq!(msg.body(), &Body::Structured(json!({"k": "v", "0": "tail"})));
    }

    #[test]
    fn test_raw_mode_skips_decoding() {
        let mut msg = HttpMessage::new(json_headers(), "");
        msg.set_body_raw(r#"{"a": 1}"#);
        assert_eq!(msg.body(), &Body::from(r#"{"a": 1}"#));
        assert_eq!(msg.get("a"), None);
    }

    #[test]
    fn test_structured_body_stored_verbatim() {
        let mut msg = HttpMessage::new(json_headers(), "");
        msg.set_body(json!({"a": [1, 2]}));
        assert_eq!(msg.body(), msg.raw_body());
    }

    #[test]
    fn test_param_access() {
        let mut msg = HttpMessage::new(HttpHeaders::new(), "raw");
        assert_eq!(msg.get("a"), None);
        assert_eq!(msg.get_or("a", json!(5)), json!(5));

        msg.set("a", json!(1)).set("b", Value::Null);
        assert_eq!(msg.get("a"), Some(&json!(1)));
        assert_eq!(msg.get("b"), None);
        assert_eq!(msg.get_many(&["a", "z"]), json!({"a": 1, "z": null}).as_object().unwrap().clone());

        msg.del("a");
        assert_eq!(msg.get("a"), None);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = HttpMessage::default();
        original.set_uri("http://example.com/");
        let mut copy = original.clone();
        copy.set_header("Host", "other.test");
        assert_eq!(original.uri().host(), Some("example.com"));
        assert_eq!(original.header("Host"), Some("example.com"));
        assert_eq!(copy.uri().host(), Some("other.test"));
    }

    #[test]
    fn test_is_xhr() {
        let msg = HttpMessage::new(
            HttpHeaders::from_pairs([("X-Requested-With", "XMLHttpRequest")]),
            "",
        );
        assert!(msg.is_xhr());
        assert!(!HttpMessage::default().is_xhr());
    }
}
