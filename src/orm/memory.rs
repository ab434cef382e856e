//! In-memory object store.
//!
//! # Design Decisions
//! - Ids are sequential per entity, starting at 1
//! - `modified` is stamped on every write and strictly increases
//! - Mandatory fields are not enforced on drafts
//! - Multilang values written in a non-default language go to a
//!   per-language overlay; reads fall back to the base value

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde_json::{Map, Value};

use crate::orm::schema::EntitySchema;
use crate::orm::store::{ObjectStore, StoreError, StoreResult};

const MANAGED_FIELDS: [&str; 3] = ["id", "created", "modified"];

#[derive(Debug, Clone, Default)]
struct StoredObject {
    values: Map<String, Value>,
    translations: HashMap<String, Map<String, Value>>,
}

#[derive(Debug, Clone)]
struct EntityTable {
    schema: EntitySchema,
    next_id: u64,
    objects: BTreeMap<u64, StoredObject>,
}

#[derive(Debug, Clone)]
pub struct InMemoryStore {
    default_lang: String,
    entities: HashMap<String, EntityTable>,
    clock: i64,
}

impl InMemoryStore {
    pub fn new(default_lang: impl Into<String>) -> Self {
        Self {
            default_lang: default_lang.into(),
            entities: HashMap::new(),
            clock: 0,
        }
    }

    pub fn register(&mut self, schema: EntitySchema) -> &mut Self {
        let name = schema.name().to_string();
        self.entities.insert(
            name,
            EntityTable {
                schema,
                next_id: 1,
                objects: BTreeMap::new(),
            },
        );
        self
    }

    pub fn len(&self, entity: &str) -> usize {
        self.entities.get(entity).map_or(0, |t| t.objects.len())
    }

    fn tick(&mut self) -> i64 {
        self.clock = Utc::now().timestamp().max(self.clock + 1);
        self.clock
    }

    fn table(&self, entity: &str) -> StoreResult<&EntityTable> {
        self.entities
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    fn table_mut(&mut self, entity: &str) -> StoreResult<&mut EntityTable> {
        self.entities
            .get_mut(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new("en")
    }
}

impl StoredObject {
    fn value(&self, field: &str, lang: &str) -> Value {
        self.translations
            .get(lang)
            .and_then(|t| t.get(field))
            .or_else(|| self.values.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn write(&mut self, schema: &EntitySchema, field: &str, value: Value, lang: &str, default_lang: &str) {
        let multilang = schema.field(field).is_some_and(|f| f.multilang);
        if multilang && lang != default_lang {
            self.translations
                .entry(lang.to_string())
                .or_default()
                .insert(field.to_string(), value);
        } else {
            self.values.insert(field.to_string(), value);
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Mandatory fields of `object` after applying `values`, unless the
/// resulting state is `draft`.
fn check_mandatory(
    schema: &EntitySchema,
    object: &StoredObject,
    values: &Map<String, Value>,
    lang: &str,
) -> StoreResult<()> {
    let resolved = |field: &str| values.get(field).cloned().unwrap_or_else(|| object.value(field, lang));
    if resolved("state").as_str() == Some("draft") {
        return Ok(());
    }
    for (name, descriptor) in schema.fields() {
        if descriptor.required && is_blank(&resolved(name)) {
            return Err(StoreError::Validation {
                field: name.to_string(),
                code: "missing_mandatory".to_string(),
            });
        }
    }
    Ok(())
}

impl ObjectStore for InMemoryStore {
    fn model(&self, entity: &str) -> Option<&EntitySchema> {
        self.entities.get(entity).map(|t| &t.schema)
    }

    fn read(
        &self,
        entity: &str,
        ids: &[u64],
        fields: &[&str],
        lang: &str,
    ) -> StoreResult<Vec<Map<String, Value>>> {
        let table = self.table(entity)?;
        ids.iter()
            .map(|id| -> StoreResult<Map<String, Value>> {
                let object = table.objects.get(id).ok_or_else(|| StoreError::UnknownObject {
                    entity: entity.to_string(),
                    id: *id,
                })?;
                let mut row = Map::new();
                row.insert("id".to_string(), Value::from(*id));
                for field in fields.iter().filter(|f| **f != "id" && table.schema.contains(f)) {
                    row.insert(field.to_string(), object.value(field, lang));
                }
                Ok(row)
            })
            .collect()
    }

    fn create(&mut self, entity: &str, values: Map<String, Value>, lang: &str) -> StoreResult<u64> {
        let now = self.tick();
        let default_lang = self.default_lang.clone();
        let table = self.table_mut(entity)?;

        let mut values: Map<String, Value> = values
            .into_iter()
            .filter(|(k, _)| table.schema.contains(k) && !MANAGED_FIELDS.contains(&k.as_str()))
            .collect();
        values
            .entry("state")
            .or_insert_with(|| Value::String("instance".to_string()));

        let mut object = StoredObject::default();
        check_mandatory(&table.schema, &object, &values, lang)?;

        let id = table.next_id;
        table.next_id += 1;
        object.values.insert("created".to_string(), Value::from(now));
        object.values.insert("modified".to_string(), Value::from(now));
        for (field, value) in values {
            object.write(&table.schema, &field, value, lang, &default_lang);
        }
        table.objects.insert(id, object);

        tracing::debug!(entity, id, "Object created");
        Ok(id)
    }

    fn update(
        &mut self,
        entity: &str,
        ids: &[u64],
        values: &Map<String, Value>,
        lang: &str,
    ) -> StoreResult<()> {
        let now = self.tick();
        let default_lang = self.default_lang.clone();
        let table = self.table_mut(entity)?;

        let values: Map<String, Value> = values
            .iter()
            .filter(|(k, _)| table.schema.contains(k) && !MANAGED_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        // validate every target before touching any
        for id in ids {
            let object = table.objects.get(id).ok_or_else(|| StoreError::UnknownObject {
                entity: entity.to_string(),
                id: *id,
            })?;
            check_mandatory(&table.schema, object, &values, lang)?;
        }

        let EntityTable { schema, objects, .. } = table;
        for id in ids {
            if let Some(object) = objects.get_mut(id) {
                for (field, value) in &values {
                    object.write(schema, field, value.clone(), lang, &default_lang);
                }
                object.values.insert("modified".to_string(), Value::from(now));
            }
        }

        tracing::debug!(entity, count = ids.len(), fields = values.len(), "Objects updated");
        Ok(())
    }

    fn clone_objects(&mut self, entity: &str, ids: &[u64], lang: &str) -> StoreResult<Vec<u64>> {
        let now = self.tick();
        let table = self.table_mut(entity)?;

        let mut originals = Vec::with_capacity(ids.len());
        for id in ids {
            let object = table.objects.get(id).ok_or_else(|| StoreError::UnknownObject {
                entity: entity.to_string(),
                id: *id,
            })?;
            originals.push(object.clone());
        }

        let mut created = Vec::with_capacity(originals.len());
        for mut object in originals {
            let id = table.next_id;
            table.next_id += 1;
            object.values.insert("created".to_string(), Value::from(now));
            object.values.insert("modified".to_string(), Value::from(now));
            table.objects.insert(id, object);
            created.push(id);
        }

        tracing::debug!(entity, lang, cloned = ?created, "Objects cloned");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::schema::FieldDescriptor;
    use serde_json::json;

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::default();
        store.register(
            EntitySchema::new("core\\User")
                .with_field("login", FieldDescriptor::new("string").required())
                .with_field("bio", FieldDescriptor::new("text").multilang()),
        );
        store
    }

    fn values(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_sequential_ids_and_defaults() {
        let mut store = store();
        let a = store.create("core\\User", values(json!({"login": "a"})), "en").unwrap();
        let b = store.create("core\\User", values(json!({"login": "b"})), "en").unwrap();
        assert_eq!((a, b), (1, 2));

        let rows = store.read("core\\User", &[a], &["state", "login", "nope"], "en").unwrap();
        assert_eq!(rows[0], values(json!({"id": 1, "state": "instance", "login": "a"})));
    }

    #[test]
    fn test_missing_mandatory_except_draft() {
        let mut store = store();
        let err = store.create("core\\User", Map::new(), "en").unwrap_err();
        assert_eq!(
            err,
            StoreError::Validation {
                field: "login".into(),
                code: "missing_mandatory".into()
            }
        );
        assert!(store.create("core\\User", values(json!({"state": "draft"})), "en").is_ok());
    }

    #[test]
    fn test_update_stamps_modified() {
        let mut store = store();
        let id = store.create("core\\User", values(json!({"login": "a"})), "en").unwrap();
        let before = store.read("core\\User", &[id], &["modified"], "en").unwrap()[0]["modified"].clone();
        store.update("core\\User", &[id], &values(json!({"login": "z"})), "en").unwrap();
        let row = &store.read("core\\User", &[id], &["modified", "login"], "en").unwrap()[0];
        assert!(row["modified"].as_i64() > before.as_i64());
        assert_eq!(row["login"], json!("z"));
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut store = store();
        let id = store.create("core\\User", values(json!({"login": "a"})), "en").unwrap();
        let err = store
            .update("core\\User", &[id, 99], &values(json!({"login": "b"})), "en")
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownObject { id: 99, .. }));
        let row = &store.read("core\\User", &[id], &["login"], "en").unwrap()[0];
        assert_eq!(row["login"], json!("a"));
    }

    #[test]
    fn test_multilang_overlay() {
        let mut store = store();
        let id = store
            .create("core\\User", values(json!({"login": "a", "bio": "hello"})), "en")
            .unwrap();
        store.update("core\\User", &[id], &values(json!({"bio": "bonjour"})), "fr").unwrap();
        assert_eq!(store.read("core\\User", &[id], &["bio"], "fr").unwrap()[0]["bio"], json!("bonjour"));
        assert_eq!(store.read("core\\User", &[id], &["bio"], "en").unwrap()[0]["bio"], json!("hello"));
        assert_eq!(store.read("core\\User", &[id], &["bio"], "nl").unwrap()[0]["bio"], json!("hello"));
    }

    #[test]
    fn test_clone_objects() {
        let mut store = store();
        let id = store.create("core\\User", values(json!({"login": "a"})), "en").unwrap();
        let clones = store.clone_objects("core\\User", &[id], "en").unwrap();
        assert_eq!(clones, vec![2]);
        assert_eq!(store.len("core\\User"), 2);
        assert_eq!(store.read("core\\User", &clones, &["login"], "en").unwrap()[0]["login"], json!("a"));
        assert_eq!(
            store.clone_objects("core\\Nope", &[1], "en"),
            Err(StoreError::UnknownEntity("core\\Nope".into()))
        );
    }
}
