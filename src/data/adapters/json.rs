//! JSON adapters.
//!
//! # Design Decisions
//! - `null` passes through every adapter untouched
//! - Dates travel as ISO 8601 strings, stored as unix timestamps

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::data::adapter::{AdaptError, DataAdapter};
use crate::data::adapters::{as_boolean, as_integer};

const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i64> = 1970..=2100;

/// Calendar year, accepted as a number or a date string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDateYear;

impl DataAdapter for JsonDateYear {
    fn usage(&self) -> &'static str {
        "json/date.year"
    }

    fn cast_in_type(&self) -> &'static str {
        "integer"
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        "Number"
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if let Some(year) = as_integer(value) {
            return Ok(Value::from(year));
        }
        value
            .as_str()
            .and_then(parse_datetime)
            .map(|dt| Value::from(i64::from(dt.year())))
            .ok_or_else(|| AdaptError::invalid("invalid_date"))
    }

    fn adapt_out(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let stored = as_integer(value).ok_or_else(|| AdaptError::invalid("invalid_year"))?;
        if PLAUSIBLE_YEARS.contains(&stored) {
            return Ok(Value::from(stored));
        }
        DateTime::from_timestamp(stored, 0)
            .map(|dt| Value::from(i64::from(dt.year())))
            .ok_or_else(|| AdaptError::invalid("invalid_year"))
    }
}

/// Point in time as an ISO 8601 string, stored as a unix timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDateTime;

impl DataAdapter for JsonDateTime {
    fn usage(&self) -> &'static str {
        "json/datetime"
    }

    fn cast_in_type(&self) -> &'static str {
        "integer"
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        "string"
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Number(_) => as_integer(value)
                .map(Value::from)
                .ok_or_else(|| AdaptError::invalid("invalid_datetime")),
            Value::String(s) => parse_datetime(s)
                .map(|dt| Value::from(dt.timestamp()))
                .ok_or_else(|| AdaptError::invalid("invalid_datetime")),
            _ => Err(AdaptError::invalid("invalid_datetime")),
        }
    }

    fn adapt_out(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        as_integer(value)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| Value::String(dt.to_rfc3339()))
            .ok_or_else(|| AdaptError::invalid("invalid_datetime"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBoolean;

impl DataAdapter for JsonBoolean {
    fn usage(&self) -> &'static str {
        "json/boolean"
    }

    fn cast_in_type(&self) -> &'static str {
        "boolean"
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        "boolean"
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        as_boolean(value)
            .map(Value::Bool)
            .ok_or_else(|| AdaptError::invalid("invalid_boolean"))
    }

    fn adapt_out(&self, value: &Value, usage: &str) -> Result<Value, AdaptError> {
        self.adapt_in(value, usage)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonInteger;

impl DataAdapter for JsonInteger {
    fn usage(&self) -> &'static str {
        "json/number.integer"
    }

    fn cast_in_type(&self) -> &'static str {
        "integer"
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        "Number"
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        as_integer(value)
            .map(Value::from)
            .ok_or_else(|| AdaptError::invalid("invalid_integer"))
    }

    fn adapt_out(&self, value: &Value, usage: &str) -> Result<Value, AdaptError> {
        self.adapt_in(value, usage)
    }
}

/// Lenient date parsing: RFC 3339, then the common SQL-ish layouts.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(dt.and_utc());
        }
    }
    for layout in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, layout) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    // year and month only
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
