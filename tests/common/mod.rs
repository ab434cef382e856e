//! Shared fixtures for integration tests.

use serde_json::{Map, Value};

use equal_http::actions::Context;
use equal_http::http::HttpRequest;
use equal_http::orm::{EntitySchema, FieldDescriptor, InMemoryStore, ObjectStore};

#[allow(dead_code)]
pub const USER: &str = "core\\User";

/// A `core\User`-like entity.
#[allow(dead_code)]
pub fn user_schema() -> EntitySchema {
    EntitySchema::new(USER)
        .with_field("login", FieldDescriptor::new("string").required())
        .with_field("firstname", FieldDescriptor::new("string"))
        .with_field("birth_year", FieldDescriptor::new("integer").with_usage("date.year"))
        .with_field("newsletter", FieldDescriptor::new("boolean"))
        .with_field("bio", FieldDescriptor::new("text").multilang())
}

/// Store holding one user (id 1, state `instance`).
#[allow(dead_code)]
pub fn seeded_store() -> InMemoryStore {
    let mut store = InMemoryStore::new("en");
    store.register(user_schema());
    store
        .create(USER, object(serde_json::json!({"login": "alice", "name": "Alice"})), "en")
        .unwrap();
    store
}

#[allow(dead_code)]
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

/// `POST` request carrying a JSON body.
#[allow(dead_code)]
pub fn json_request(body: &Value) -> HttpRequest {
    let payload = body.to_string();
    let raw = format!(
        "POST /?do=model_update HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {payload}",
        payload.len()
    );
    HttpRequest::parse(&raw).unwrap()
}

/// `POST` request carrying a form-encoded body.
#[allow(dead_code)]
pub fn form_request(body: &str) -> HttpRequest {
    let raw = format!(
        "POST / HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         \r\n\
         {body}"
    );
    HttpRequest::parse(&raw).unwrap()
}

/// Status code and decoded JSON body of what a context wrote.
#[allow(dead_code)]
pub fn sent(ctx: Context<Vec<u8>>) -> (u16, Value) {
    let wire = String::from_utf8(ctx.into_sink()).unwrap();
    let (head, body) = wire.split_once("\r\n\r\n").unwrap();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, serde_json::from_str(body).unwrap())
}

/// Live `modified` marker of `id`, as a client would see it.
#[allow(dead_code)]
pub fn wire_modified(store: &InMemoryStore, id: u64) -> Value {
    use equal_http::data::DataAdapterProvider;

    let row = store.read(USER, &[id], &["modified"], "en").unwrap();
    DataAdapterProvider::global()
        .resolve("json/datetime")
        .adapt_out(&row[0]["modified"], "datetime")
        .unwrap()
}
