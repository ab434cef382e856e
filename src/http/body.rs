//! Message body model and content-type driven decoding.
//!
//! # Data Flow
//! ```text
//! raw payload + Content-Type
//!     → normalize vendor types (+json, +xml)
//!     → multipart   → multipart.rs → re-encoded query ┐
//!     → urlencoded  ← ────────────────────────────────┘
//!     → json        (big integers kept as strings)
//!     → xml         → xml.rs (element tree → mapping)
//!     → anything else stays raw
//! ```
//!
//! # Design Decisions
//! - Decoding never fails: every branch falls back to `Body::Raw`
//! - Structured values are `serde_json::Value` with preserved key order
//! - The query codec follows PHP's `parse_str` / `http_build_query`
//!   conventions (bracket notation, `max_input_vars` truncation)

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::HttpConfig;
use crate::http::headers::HttpHeaders;
use crate::http::{multipart, xml};
use crate::observability::metrics;

pub const DEFAULT_MAX_INPUT_VARS: usize = 1000;

/// A message payload: either the bytes as received or a decoded structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Raw(String),
    Structured(Value),
}

impl Default for Body {
    fn default() -> Self {
        Body::Raw(String::new())
    }
}

impl Body {
    pub fn is_structured(&self) -> bool {
        matches!(self, Body::Structured(_))
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Body::Raw(s) => Some(s),
            Body::Structured(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Body::Structured(v) => Some(v),
            Body::Raw(_) => None,
        }
    }

    /// The body as a key/value mapping, when it is one.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        self.as_value().and_then(Value::as_object)
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match self {
            Body::Structured(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Serialize for the wire according to a media type.
    pub fn encode(&self, content_type: Option<&str>) -> String {
        let value = match self {
            Body::Raw(s) => return s.clone(),
            Body::Structured(v) => v,
        };
        let content_type = content_type.map(normalize_content_type).unwrap_or_default();
        match content_type.as_str() {
            "application/x-www-form-urlencoded" | "multipart/form-data" => match value {
                Value::Object(map) => build_query(map),
                other => scalar_to_string(other).unwrap_or_default(),
            },
            "text/xml" | "application/xml" => {
                xml::to_xml(value).unwrap_or_else(|| value.to_string())
            }
            _ => match value {
                Value::String(s) if content_type.starts_with("text/") => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Raw(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Raw(s)
    }
}

impl From<Value> for Body {
    /// Strings are payloads still to be decoded; everything else is structured.
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Body::Raw(s),
            other => Body::Structured(other),
        }
    }
}

impl From<Map<String, Value>> for Body {
    fn from(map: Map<String, Value>) -> Self {
        Body::Structured(Value::Object(map))
    }
}

/// Map vendor media types onto the generic ones the decoder knows.
pub fn normalize_content_type(content_type: &str) -> String {
    let ct = content_type.trim().to_ascii_lowercase();
    if ct.ends_with("+json") {
        "application/json".to_string()
    } else if ct.ends_with("+xml") {
        "application/xml".to_string()
    } else {
        ct
    }
}

/// Stateless decoder; the only knob is the form field limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyDecoder {
    max_input_vars: usize,
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self {
            max_input_vars: DEFAULT_MAX_INPUT_VARS,
        }
    }
}

impl From<&HttpConfig> for BodyDecoder {
    fn from(config: &HttpConfig) -> Self {
        Self::new(config.max_input_vars)
    }
}

impl BodyDecoder {
    pub fn new(max_input_vars: usize) -> Self {
        Self { max_input_vars }
    }

    pub fn max_input_vars(&self) -> usize {
        self.max_input_vars
    }

    /// Decode `raw` according to the `Content-Type` found in `headers`.
    pub fn decode(&self, raw: &str, headers: &HttpHeaders) -> Body {
        let content_type = headers
            .get_content_type()
            .map(|ct| normalize_content_type(&ct))
            .unwrap_or_default();

        let decoded = match content_type.as_str() {
            "multipart/form-data" => {
                self.decode_multipart(raw, headers.get("Content-Type").unwrap_or_default())
            }
            "application/x-www-form-urlencoded" => {
                Some(Value::Object(parse_query(raw, self.max_input_vars)))
            }
            "application/json" | "application/javascript" | "text/javascript" => decode_json(raw),
            "text/xml" | "application/xml" => {
                let parsed = xml::parse(raw);
                if parsed.is_none() {
                    tracing::debug!(content_type = %content_type, "XML payload rejected, keeping raw body");
                }
                parsed
            }
            _ => {
                metrics::record_body_decode(&content_type, "raw");
                return Body::Raw(raw.to_string());
            }
        };

        match decoded {
            Some(value) => {
                metrics::record_body_decode(&content_type, "structured");
                Body::Structured(value)
            }
            None => {
                metrics::record_body_decode(&content_type, "fallback");
                Body::Raw(raw.to_string())
            }
        }
    }

    fn decode_multipart(&self, raw: &str, content_type_header: &str) -> Option<Value> {
        let Some(boundary) = multipart::boundary(content_type_header) else {
            tracing::debug!(header = %content_type_header, "multipart boundary missing, keeping raw body");
            return None;
        };
        let fields = multipart::parse(raw, &boundary);
        // flatten through the form encoding so bracketed names nest the same way
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &fields {
            serializer.append_pair(name, value);
        }
        let query = serializer.finish();
        Some(Value::Object(parse_query(&query, self.max_input_vars)))
    }
}

fn decode_json(raw: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(big_integers_as_strings(value)),
        Err(e) => {
            tracing::debug!(error = %e, "JSON payload rejected, keeping raw body");
            None
        }
    }
}

/// Integers that do not fit a signed 64-bit value become strings.
fn big_integers_as_strings(value: Value) -> Value {
    match value {
        Value::Number(n) if !n.is_i64() && !n.is_f64() => Value::String(n.to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(big_integers_as_strings).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, big_integers_as_strings(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Decode a form-encoded string.
///
/// `a[]=1&a[]=2` gives a sequence, `a[b]=1` a nested mapping. Dots and
/// spaces in base names become underscores. Pairs beyond `max_vars` are
/// dropped.
pub fn parse_query(query: &str, max_vars: usize) -> Map<String, Value> {
    let mut root = Map::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()).take(max_vars) {
        let Some((base, path)) = split_key(&key) else {
            continue;
        };
        insert_path(&mut root, base, &path, Value::String(value.into_owned()));
    }
    for value in root.values_mut() {
        normalize_lists(value);
    }
    root
}

fn split_key(key: &str) -> Option<(String, Vec<String>)> {
    let key = key.trim_start();
    let (base, rest) = match key.find('[') {
        Some(i) if i > 0 && key[i..].contains(']') => (&key[..i], &key[i..]),
        Some(0) => return None,
        _ => (key, ""),
    };
    if base.is_empty() {
        return None;
    }
    let base: String = base
        .chars()
        .map(|c| if c == '.' || c == ' ' || c == '[' { '_' } else { c })
        .collect();

    let mut path = Vec::new();
    let mut rest = rest;
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => {
                path.push(stripped[..end].to_string());
                rest = &stripped[end + 1..];
            }
            None => break,
        }
    }
    Some((base, path))
}

fn next_index(map: &Map<String, Value>) -> String {
    map.keys()
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
        .to_string()
}

fn insert_path(map: &mut Map<String, Value>, key: String, path: &[String], value: Value) {
    let key = if key.is_empty() { next_index(map) } else { key };
    match path.split_first() {
        None => {
            map.insert(key, value);
        }
        Some((head, tail)) => {
            let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                insert_path(child, head.clone(), tail, value);
            }
        }
    }
}

/// Turn mappings keyed `"0".."n-1"` (in order) into sequences, recursively.
pub(crate) fn normalize_lists(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                normalize_lists(child);
            }
            let sequential = map
                .keys()
                .enumerate()
                .all(|(i, k)| k.parse::<usize>().map(|n| n == i).unwrap_or(false));
            if sequential && !map.is_empty() {
                let items: Vec<Value> = std::mem::take(map).into_iter().map(|(_, v)| v).collect();
                *value = Value::Array(items);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_lists),
        _ => {}
    }
}

/// Encode a mapping as a form query string; nested values use brackets.
pub fn build_query(map: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in map {
        flatten_pairs(key.clone(), value, &mut pairs);
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &pairs {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}

fn flatten_pairs(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten_pairs(format!("{prefix}[{k}]"), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_pairs(format!("{prefix}[{i}]"), v, out);
            }
        }
        scalar => {
            if let Some(s) = scalar_to_string(scalar) {
                out.push((prefix, s));
            }
        }
    }
}

/// String form of a scalar the way PHP's `strval` renders it.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
