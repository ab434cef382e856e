//! SQL adapters.
//!
//! The cast-out type is the column declaration used by schema generation;
//! runtime conversion is the same across dialects.

use serde_json::Value;

use crate::data::adapter::{AdaptError, DataAdapter};
use crate::data::adapters::{as_boolean, as_integer};

fn boolean_from_sql(value: &Value) -> Result<Value, AdaptError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    as_integer(value)
        .map(|n| Value::Bool(n != 0))
        .or_else(|| as_boolean(value).map(Value::Bool))
        .ok_or_else(|| AdaptError::invalid("invalid_boolean"))
}

fn boolean_to_sql(value: &Value) -> Result<Value, AdaptError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    as_boolean(value)
        .map(|b| Value::from(i64::from(b)))
        .ok_or_else(|| AdaptError::invalid("invalid_boolean"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlBooleanMySql;

impl DataAdapter for SqlBooleanMySql {
    fn usage(&self) -> &'static str {
        "sql/boolean"
    }

    fn cast_in_type(&self) -> &'static str {
        "boolean"
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        "TINYINT(4)"
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        boolean_from_sql(value)
    }

    fn adapt_out(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        boolean_to_sql(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlBooleanSqlite;

impl DataAdapter for SqlBooleanSqlite {
    fn usage(&self) -> &'static str {
        "sql/boolean"
    }

    fn cast_in_type(&self) -> &'static str {
        "boolean"
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        "INTEGER"
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        boolean_from_sql(value)
    }

    fn adapt_out(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        boolean_to_sql(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_declarations() {
        assert_eq!(SqlBooleanMySql.cast_in_type(), "boolean");
        assert_eq!(SqlBooleanMySql.cast_out_type(None), "TINYINT(4)");
        assert_eq!(SqlBooleanSqlite.cast_out_type(Some("boolean")), "INTEGER");
    }

    #[test]
    fn test_conversion() {
        assert_eq!(SqlBooleanMySql.adapt_in(&json!("1"), "boolean"), Ok(json!(true)));
        assert_eq!(SqlBooleanMySql.adapt_in(&json!(0), "boolean"), Ok(json!(false)));
        assert_eq!(SqlBooleanSqlite.adapt_out(&json!(true), "boolean"), Ok(json!(1)));
        assert_eq!(SqlBooleanSqlite.adapt_out(&Value::Null, "boolean"), Ok(Value::Null));
    }
}
