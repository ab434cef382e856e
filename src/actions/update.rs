//! Update (fully or partially) one or more objects.
//!
//! # Responsibilities
//! - Resolve target ids and the entity schema
//! - Filter and adapt submitted field values
//! - Enforce optimistic concurrency on single-object updates
//! - Respond with the canonical fields of the updated objects
//!
//! # Design Decisions
//! - Unknown fields are dropped silently
//! - A draft edition whose original left the draft state forks a new draft
//! - A stale `modified` marker is a conflict unless `force` is set

use std::io::Write;

use serde_json::{json, Map, Value};

use crate::actions::announce::{announce, identifiers, Announcement, ParamSpec, ParamType, ResponseSpec};
use crate::actions::context::Context;
use crate::data::DataAdapterProvider;
use crate::error::EqualError;
use crate::http::HttpMessage;
use crate::observability::metrics;
use crate::orm::{EntitySchema, ObjectStore};

pub const NAME: &str = "model_update";

const CANONICAL_FIELDS: [&str; 4] = ["id", "state", "name", "modified"];

pub fn announcement(default_lang: &str) -> Announcement {
    Announcement {
        name: NAME,
        description: "Update (fully or partially) the given object.",
        params: vec![
            ParamSpec::required("entity", ParamType::String, "Full name (including namespace) of the class."),
            ParamSpec::optional("id", ParamType::Integer, 0, "Unique identifier of the object to update."),
            ParamSpec::optional("ids", ParamType::Array, json!([]), "Identifiers of the objects to update."),
            ParamSpec::optional("fields", ParamType::Array, json!([]), "Fields to update, mapped to their values."),
            ParamSpec::optional("force", ParamType::Boolean, false, "Update even if a concurrent change is detected."),
            ParamSpec::optional("lang", ParamType::String, default_lang, "Language for multilang fields."),
        ],
        response: ResponseSpec::default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateParams {
    pub entity: String,
    pub id: i64,
    pub ids: Vec<u64>,
    pub fields: Map<String, Value>,
    pub force: bool,
    pub lang: String,
}

impl UpdateParams {
    pub fn from_request(request: &HttpMessage, default_lang: &str) -> Result<Self, EqualError> {
        let params = Value::Object(announce(&announcement(default_lang), request)?);
        let ids = identifiers("ids", &params["ids"])?;
        let fields = match &params["fields"] {
            Value::Object(map) => map.clone(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            _ => Map::new(),
        };
        Ok(Self {
            entity: params["entity"].as_str().unwrap_or_default().to_string(),
            id: params["id"].as_i64().unwrap_or_default(),
            ids,
            fields,
            force: params["force"].as_bool().unwrap_or_default(),
            lang: params["lang"].as_str().unwrap_or(default_lang).to_string(),
        })
    }
}

/// Run the update and send the result through `ctx`.
pub fn update<S, W>(
    params: UpdateParams,
    store: &mut S,
    adapters: &DataAdapterProvider,
    ctx: &mut Context<W>,
) -> Result<(), EqualError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let result = apply(params, store, adapters);
    let outcome = match &result {
        Ok(_) => "ok",
        Err(EqualError::Conflict(_)) => "conflict",
        Err(_) => "error",
    };
    metrics::record_action(NAME, outcome);

    let objects = result?;
    ctx.respond(200, Value::Array(objects))
}

fn apply<S: ObjectStore + ?Sized>(
    params: UpdateParams,
    store: &mut S,
    adapters: &DataAdapterProvider,
) -> Result<Vec<Value>, EqualError> {
    let UpdateParams {
        entity,
        id,
        mut ids,
        fields,
        force,
        lang,
    } = params;

    if ids.is_empty() {
        if id <= 0 {
            return Err(EqualError::InvalidParam("object_invalid_id".to_string()));
        }
        ids.push(id as u64);
    }

    let schema = store
        .model(&entity)
        .cloned()
        .ok_or_else(|| EqualError::InvalidParam("unknown_entity".to_string()))?;

    let fields = adapt_fields(&schema, fields, adapters)?;
    if fields.is_empty() {
        tracing::debug!(entity = %entity, "No applicable fields, nothing to update");
        return Ok(Vec::new());
    }

    if ids.len() == 1 {
        if fields.get("state").and_then(Value::as_str) == Some("draft") {
            let live = store.read(&entity, &ids, &["state"], &lang)?;
            let live_state = live.first().and_then(|o| o.get("state")).and_then(Value::as_str);
            if live_state != Some("draft") {
                let mut draft = Map::new();
                draft.insert("state".to_string(), Value::String("draft".to_string()));
                let fork = store.create(&entity, draft, &lang)?;
                store.update(&entity, &[fork], &fields, &lang)?;
                tracing::info!(entity = %entity, original = ids[0], draft = fork, "Draft forked from changed object");
                ids = vec![fork];
            }
        } else if let Some(submitted) = fields.get("modified") {
            let live = store.read(&entity, &ids, &["modified"], &lang)?;
            let live_modified = live.first().and_then(|o| o.get("modified")).cloned().unwrap_or(Value::Null);
            if &live_modified != submitted && !force {
                tracing::warn!(entity = %entity, id = ids[0], "Concurrent change detected");
                return Err(EqualError::Conflict("concurrent_change".to_string()));
            }
        }
    }

    store.update(&entity, &ids, &fields, &lang)?;
    let rows = store.read(&entity, &ids, &CANONICAL_FIELDS, &lang)?;

    rows.into_iter()
        .map(|row| adapt_out(&schema, row, adapters).map(Value::Object))
        .collect()
}

/// Known fields only, converted from their wire representation.
fn adapt_fields(
    schema: &EntitySchema,
    fields: Map<String, Value>,
    adapters: &DataAdapterProvider,
) -> Result<Map<String, Value>, EqualError> {
    let mut adapted = Map::new();
    for (name, value) in fields {
        let Some(descriptor) = schema.field(&name) else {
            continue;
        };
        let textual = matches!(descriptor.result_type.as_str(), "string" | "text");
        let collection = value.is_array() || value.is_object();
        let empty = !collection && is_empty_text(&value);

        if empty && !value.is_null() && !textual && descriptor.result_type != "boolean" {
            continue;
        }
        if empty && textual {
            adapted.insert(name, Value::Null);
            continue;
        }
        let adapter = adapters.resolve_for("json", descriptor.usage_tag());
        let converted = adapter
            .adapt_in(&value, descriptor.usage_tag())
            .map_err(|err| EqualError::field(&name, err))?;
        adapted.insert(name, converted);
    }
    Ok(adapted)
}

fn adapt_out(
    schema: &EntitySchema,
    row: Map<String, Value>,
    adapters: &DataAdapterProvider,
) -> Result<Map<String, Value>, EqualError> {
    row.into_iter()
        .map(|(name, value)| {
            let usage = schema.field(&name).map(|f| f.usage_tag()).unwrap_or("default");
            adapters
                .resolve_for("json", usage)
                .adapt_out(&value, usage)
                .map(|v| (name.clone(), v))
                .map_err(|err| EqualError::field(&name, err))
        })
        .collect()
}

/// Whether the value reads as an empty string (`null`, `false`, `""`).
fn is_empty_text(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false)) || value.as_str() == Some("")
}
