//! Action declarations and parameter extraction.
//!
//! # Responsibilities
//! - Declare an action's params and response descriptor
//! - Read declared params from the request body and coerce them
//!
//! # Design Decisions
//! - `null` counts as absent
//! - Undeclared request params are ignored
//! - Arrays also accept JSON text and comma separated lists

use serde_json::{Map, Value};

use crate::data::adapters::{as_boolean, as_integer};
use crate::error::EqualError;
use crate::http::HttpMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    Array,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(
        name: &'static str,
        kind: ParamType,
        default: impl Into<Value>,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: Some(default.into()),
        }
    }
}

/// Headers every response of the action carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    pub content_type: &'static str,
    pub charset: &'static str,
    pub accept_origin: &'static str,
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            content_type: "application/json",
            charset: "UTF-8",
            accept_origin: "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub response: ResponseSpec,
}

/// Extract the declared params from `request`.
pub fn announce(announcement: &Announcement, request: &HttpMessage) -> Result<Map<String, Value>, EqualError> {
    let mut params = Map::new();
    for spec in &announcement.params {
        match request.get(spec.name) {
            Some(value) => {
                let coerced = coerce(spec.kind, value)
                    .ok_or_else(|| EqualError::InvalidParam(spec.name.to_string()))?;
                params.insert(spec.name.to_string(), coerced);
            }
            None if spec.required => {
                tracing::info!(action = announcement.name, param = spec.name, "Missing required parameter");
                return Err(EqualError::MissingParam(spec.name.to_string()));
            }
            None => {
                params.insert(spec.name.to_string(), spec.default.clone().unwrap_or(Value::Null));
            }
        }
    }
    Ok(params)
}

/// Positive object identifiers from an `array` param.
pub fn identifiers(name: &str, value: &Value) -> Result<Vec<u64>, EqualError> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| {
            as_integer(item)
                .filter(|id| *id > 0)
                .map(|id| id as u64)
                .ok_or_else(|| EqualError::InvalidParam(name.to_string()))
        })
        .collect()
}

fn coerce(kind: ParamType, value: &Value) -> Option<Value> {
    match kind {
        ParamType::String => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(if *b { "1" } else { "" }.to_string())),
            _ => None,
        },
        ParamType::Integer => match value {
            Value::Bool(_) => None,
            _ => as_integer(value).map(Value::from),
        },
        ParamType::Boolean => as_boolean(value).map(Value::Bool),
        ParamType::Array => match value {
            Value::Array(_) | Value::Object(_) => Some(value.clone()),
            Value::String(s) => Some(array_from_text(s)),
            Value::Number(_) | Value::Bool(_) => Some(Value::Array(vec![value.clone()])),
            Value::Null => None,
        },
    }
}

fn array_from_text(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::Array(Vec::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => value,
        _ => Value::Array(
            text.split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpHeaders;
    use serde_json::json;

    fn announcement() -> Announcement {
        Announcement {
            name: "test",
            description: "test action",
            params: vec![
                ParamSpec::required("entity", ParamType::String, "class name"),
                ParamSpec::optional("id", ParamType::Integer, 0, "identifier"),
                ParamSpec::optional("ids", ParamType::Array, json!([]), "identifiers"),
                ParamSpec::optional("force", ParamType::Boolean, false, "force"),
            ],
            response: ResponseSpec::default(),
        }
    }

    fn request(body: Value) -> HttpMessage {
        HttpMessage::new(HttpHeaders::new(), body)
    }

    #[test]
    fn test_coerces_and_defaults() {
        let params = announce(
            &announcement(),
            &request(json!({"entity": "core\\User", "id": "12", "force": "true", "extra": 1})),
        )
        .unwrap();
        assert_eq!(
            Value::Object(params),
            json!({"entity": "core\\User", "id": 12, "ids": [], "force": true})
        );
    }

    #[test]
    fn test_missing_required() {
        let err = announce(&announcement(), &request(json!({"id": 1}))).unwrap_err();
        assert!(matches!(err, EqualError::MissingParam(ref p) if p == "entity"));
    }

    #[test]
    fn test_null_is_absent() {
        let err = announce(&announcement(), &request(json!({"entity": null}))).unwrap_err();
        assert!(matches!(err, EqualError::MissingParam(_)));
    }

    #[test]
    fn test_invalid_value() {
        let err = announce(&announcement(), &request(json!({"entity": "x", "id": "abc"}))).unwrap_err();
        assert!(matches!(err, EqualError::InvalidParam(ref p) if p == "id"));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(identifiers("ids", &json!([1, "2"])).unwrap(), vec![1, 2]);
        assert_eq!(identifiers("ids", &json!({"a": 3})).unwrap(), vec![3]);
        assert!(identifiers("ids", &json!([0])).is_err());
        assert!(identifiers("ids", &json!(["x"])).is_err());
    }

    #[test]
    fn test_array_from_text() {
        assert_eq!(array_from_text("[1,2]"), json!([1, 2]));
        assert_eq!(array_from_text("3, 4"), json!(["3", "4"]));
        assert_eq!(array_from_text(""), json!([]));
    }
}
