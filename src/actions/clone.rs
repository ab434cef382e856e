//! Create new objects by cloning existing ones.

use std::io::Write;

use serde_json::{json, Value};

use crate::actions::announce::{announce, identifiers, Announcement, ParamSpec, ParamType, ResponseSpec};
use crate::actions::context::Context;
use crate::error::EqualError;
use crate::http::HttpMessage;
use crate::observability::metrics;
use crate::orm::ObjectStore;

pub const NAME: &str = "model_clone";

pub fn announcement(default_lang: &str) -> Announcement {
    Announcement {
        name: NAME,
        description: "Create a new object by cloning an existing object.",
        params: vec![
            ParamSpec::required("entity", ParamType::String, "Full name (including namespace) of the class."),
            ParamSpec::required("ids", ParamType::Array, "Identifiers of original objects."),
            ParamSpec::optional("lang", ParamType::String, default_lang, "Language of target objects."),
        ],
        response: ResponseSpec::default(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneParams {
    pub entity: String,
    pub ids: Vec<u64>,
    pub lang: String,
}

impl CloneParams {
    pub fn from_request(request: &HttpMessage, default_lang: &str) -> Result<Self, EqualError> {
        let params = Value::Object(announce(&announcement(default_lang), request)?);
        Ok(Self {
            entity: params["entity"].as_str().unwrap_or_default().to_string(),
            ids: identifiers("ids", &params["ids"])?,
            lang: params["lang"].as_str().unwrap_or(default_lang).to_string(),
        })
    }
}

/// Clone every object; responds `201` with an empty list.
pub fn clone<S, W>(params: CloneParams, store: &mut S, ctx: &mut Context<W>) -> Result<(), EqualError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let result = store.clone_objects(&params.entity, &params.ids, &params.lang);
    metrics::record_action(NAME, if result.is_ok() { "ok" } else { "error" });

    let created = result?;
    tracing::info!(entity = %params.entity, originals = ?params.ids, clones = ?created, "Objects cloned");
    ctx.respond(201, json!([]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpHeaders;

    #[test]
    fn test_ids_required() {
        let request = HttpMessage::new(HttpHeaders::new(), json!({"entity": "core\\User"}));
        let err = CloneParams::from_request(&request, "en").unwrap_err();
        assert!(matches!(err, EqualError::MissingParam(ref p) if p == "ids"));
    }

    #[test]
    fn test_params_from_form_text() {
        let request = HttpMessage::new(HttpHeaders::new(), json!({"entity": "core\\User", "ids": "1,2"}));
        let params = CloneParams::from_request(&request, "en").unwrap();
        assert_eq!(params.ids, vec![1, 2]);
        assert_eq!(params.lang, "en");
    }
}
