//! Adapter registry.
//!
//! # Responsibilities
//! - Map usage tags to adapters
//! - Fall back to the passthrough adapter for unknown tags
//!
//! # Design Decisions
//! - Immutable after construction, shared without locks
//! - O(1) lookup via HashMap
//! - The process-wide instance targets MySQL; other dialects build their own

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::config::Dbms;
use crate::data::adapter::DataAdapter;
use crate::data::adapters::json::{JsonBoolean, JsonDateTime, JsonDateYear, JsonInteger};
use crate::data::adapters::sql::{SqlBooleanMySql, SqlBooleanSqlite};
use crate::data::adapters::DefaultAdapter;

#[derive(Debug)]
pub struct DataAdapterProvider {
    dbms: Dbms,
    adapters: HashMap<&'static str, Box<dyn DataAdapter>>,
    fallback: DefaultAdapter,
}

impl DataAdapterProvider {
    pub fn new(dbms: Dbms) -> Self {
        let mut adapters: Vec<Box<dyn DataAdapter>> = vec![
            Box::new(JsonDateYear),
            Box::new(JsonDateTime),
            Box::new(JsonBoolean),
            Box::new(JsonInteger),
        ];
        match dbms {
            Dbms::Mysql => adapters.push(Box::new(SqlBooleanMySql)),
            Dbms::Sqlite => adapters.push(Box::new(SqlBooleanSqlite)),
        }

        let adapters: HashMap<_, _> = adapters.into_iter().map(|a| (a.usage(), a)).collect();
        tracing::debug!(dbms = dbms.as_str(), adapters = adapters.len(), "Adapter registry built");
        Self {
            dbms,
            adapters,
            fallback: DefaultAdapter,
        }
    }

    /// Shared MySQL registry.
    pub fn global() -> &'static DataAdapterProvider {
        static PROVIDER: OnceLock<DataAdapterProvider> = OnceLock::new();
        PROVIDER.get_or_init(|| DataAdapterProvider::new(Dbms::Mysql))
    }

    pub fn dbms(&self) -> Dbms {
        self.dbms
    }

    pub fn resolve(&self, tag: &str) -> &dyn DataAdapter {
        match self.adapters.get(tag) {
            Some(adapter) => adapter.as_ref(),
            None => &self.fallback,
        }
    }

    /// Adapter of a format family (`json`, `sql`) for a field usage.
    pub fn resolve_for(&self, family: &str, usage: &str) -> &dyn DataAdapter {
        self.resolve(&format!("{family}/{usage}"))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.adapters.contains_key(tag)
    }
}

impl Default for DataAdapterProvider {
    fn default() -> Self {
        Self::new(Dbms::default())
    }
}
