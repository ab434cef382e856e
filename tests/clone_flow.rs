//! Clone action over the in-memory store.

use serde_json::json;

use equal_http::actions::clone::{self, CloneParams};
use equal_http::actions::{Context, ResponseSpec};
use equal_http::orm::ObjectStore;

mod common;
use common::USER;

#[test]
fn test_clone_responds_created_with_empty_list() {
    let mut store = common::seeded_store();
    let request = common::json_request(&json!({"entity": USER, "ids": [1], "lang": "en"}));
    let params = CloneParams::from_request(&request, "en").unwrap();

    let mut ctx = Context::new(Vec::new(), &ResponseSpec::default());
    clone::clone(params, &mut store, &mut ctx).unwrap();

    let (status, body) = common::sent(ctx);
    assert_eq!(status, 201);
    assert_eq!(body, json!([]));
    assert_eq!(store.len(USER), 2);
    let copy = &store.read(USER, &[2], &["login", "name"], "en").unwrap()[0];
    assert_eq!(copy["login"], json!("alice"));
    assert_eq!(copy["name"], json!("Alice"));
}

#[test]
fn test_clone_unknown_object() {
    let mut store = common::seeded_store();
    let params = CloneParams {
        entity: USER.to_string(),
        ids: vec![1, 5],
        lang: "en".to_string(),
    };
    let mut ctx = Context::new(Vec::new(), &ResponseSpec::default());
    let err = clone::clone(params, &mut store, &mut ctx).unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert_eq!(store.len(USER), 1);
}
