use serde_json::Value;

use crate::data::adapter::{AdaptError, DataAdapter};

/// Identity in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdapter;

impl DataAdapter for DefaultAdapter {
    fn usage(&self) -> &'static str {
        "default"
    }

    fn cast_in_type(&self) -> &'static str {
        ""
    }

    fn cast_out_type(&self, _usage: Option<&str>) -> &'static str {
        ""
    }

    fn adapt_in(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        Ok(value.clone())
    }

    fn adapt_out(&self, value: &Value, _usage: &str) -> Result<Value, AdaptError> {
        Ok(value.clone())
    }
}
