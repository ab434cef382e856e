//! Message-level properties: decoding, fallbacks, status, method and
//! URI/Host synchronisation.

use serde_json::{json, Value};

use equal_http::http::status::HTTP_STATUS_CODES;
use equal_http::http::{Body, HttpHeaders, HttpMessage, HttpMethod, HttpRequest, HttpResponse};

fn with_type(content_type: &str, payload: &str) -> HttpMessage {
    HttpMessage::new(HttpHeaders::from_pairs([("Content-Type", content_type)]), payload)
}

#[test]
fn test_form_body() {
    let msg = with_type("application/x-www-form-urlencoded", "a=1&b=2");
    assert_eq!(msg.body(), &Body::Structured(json!({"a": "1", "b": "2"})));
    assert_eq!(msg.raw_body(), &Body::from("a=1&b=2"));
}

#[test]
fn test_big_integer_kept_as_string() {
    let msg = with_type("application/json", r#"{"id": 123456789012345678901234567890, "n": 5}"#);
    assert_eq!(msg.get("id"), Some(&json!("123456789012345678901234567890")));
    assert_eq!(msg.get("n"), Some(&json!(5)));
}

#[test]
fn test_vendor_json_type() {
    let msg = with_type("application/vnd.api+json; charset=utf-8", r#"{"data": []}"#);
    assert_eq!(msg.get("data"), Some(&json!([])));
}

#[test]
fn test_xml_children_shape() {
    let msg = with_type("application/xml", "<root><item>1</item><item>2</item></root>");
    let body = msg.body().as_value().unwrap();
    assert_eq!(body["children"].as_array().map(Vec::len), Some(2));

    let msg = with_type("text/xml", "<root><a>1</a><b>2</b></root>");
    let body = msg.body().as_value().unwrap();
    assert_eq!(body["children"]["a"]["value"], json!("1"));
    assert_eq!(body["children"]["b"]["value"], json!("2"));
}

#[test]
fn test_malformed_payloads_fall_back_to_raw() {
    let cases = [
        ("application/json", "{\"a\": "),
        ("application/xml", "<root><open></root>"),
        ("multipart/form-data", "--x\r\n\r\nbody\r\n--x--"),
    ];
    for (content_type, payload) in cases {
        let msg = with_type(content_type, payload);
        assert_eq!(msg.raw_body(), &Body::from(payload), "{content_type}");
        assert_eq!(msg.body(), msg.raw_body(), "{content_type}");
    }
}

#[test]
fn test_plain_text_verbatim() {
    let msg = with_type("text/plain", "a=1&b=2");
    assert_eq!(msg.body(), &Body::from("a=1&b=2"));
    assert_eq!(msg.get("a"), None);
}

#[test]
fn test_multipart_with_file() {
    let payload = "--XyZ\r\n\
                   Content-Disposition: form-data; name=\"title\"\r\n\
                   \r\n\
                   Hello\r\n\
                   --XyZ\r\n\
                   Content-Disposition: form-data; name=\"tags[0]\"\r\n\
                   \r\n\
                   a\r\n\
                   --XyZ\r\n\
                   Content-Disposition: form-data; name=\"tags[1]\"\r\n\
                   \r\n\
                   b\r\n\
                   --XyZ\r\n\
                   Content-Disposition: form-data; name=\"doc\"; filename=\"d.bin\"\r\n\
                   Content-Type: application/octet-stream\r\n\
                   \r\n\
                   raw bytes\r\n\
                   --XyZ--\r\n";
    let msg = with_type("multipart/form-data; boundary=XyZ", payload);
    assert_eq!(
        msg.body(),
        &Body::Structured(json!({"title": "Hello", "tags": ["a", "b"], "doc": "raw bytes"}))
    );
}

#[test]
fn test_every_registered_status_round_trips() {
    let mut msg = HttpMessage::default();
    for (code, reason) in HTTP_STATUS_CODES {
        msg.set_status_code(*code);
        assert_eq!(msg.status_code(), *code);
        assert!(msg.status().unwrap().contains(reason), "{code}");
    }
    msg.set_status("299");
    assert_eq!(msg.status(), Some("299"));
    assert_eq!(msg.status_code(), 299);
}

#[test]
fn test_method_case_and_rejection() {
    let mut msg = HttpMessage::default();
    for method in HttpMethod::ALL.iter() {
        msg.set_method(&method.as_str().to_ascii_lowercase());
        assert_eq!(msg.method(), *method);
    }
    msg.set_method("post");
    msg.set_method("FETCH");
    assert_eq!(msg.method(), HttpMethod::Post);
}

#[test]
fn test_uri_and_host_stay_in_sync() {
    let mut msg = HttpMessage::default();
    msg.set_uri("http://example.com:8080/path?x=1");
    assert_eq!(msg.header("Host"), Some("example.com:8080"));
    assert_eq!(msg.get("x"), Some(&json!("1")));

    msg.set_header("Host", "foo.test");
    assert_eq!(msg.uri().host(), Some("foo.test"));
}

#[test]
fn test_reverse_serialization_round_trips() {
    let cases = [
        ("application/json", r#"{"a":[1,2],"b":{"c":"d"}}"#),
        ("application/x-www-form-urlencoded", "a=1&b%5Bc%5D=2&d%5B0%5D=x"),
        ("application/xml", r#"<root id="1"><a>1</a><b>2</b></root>"#),
    ];
    for (content_type, payload) in cases {
        let msg = with_type(content_type, payload);
        let encoded = msg.body().encode(Some(content_type));
        let again = with_type(content_type, &encoded);
        assert_eq!(again.body(), msg.body(), "{content_type}");
    }
}

#[test]
fn test_request_to_response_on_the_wire() {
    let request = HttpRequest::parse(
        "PATCH /core/user?id=3 HTTP/1.1\r\n\
         Host: api.test\r\n\
         X-Requested-With: XMLHttpRequest\r\n\
         Content-Type: application/json\r\n\
         \r\n\
         {\"fields\":{\"login\":\"x\"}}",
    )
    .unwrap();
    assert!(request.is_xhr());
    assert_eq!(request.method(), HttpMethod::Patch);
    assert_eq!(request.get("id"), Some(&json!("3")));
    assert_eq!(request.get("fields"), Some(&json!({"login": "x"})));

    let mut response = HttpResponse::new("HTTP/1.1 200", HttpHeaders::new(), "");
    response
        .set_content_type("application/json")
        .set_body(Value::Array(vec![json!({"id": 3})]));
    let wire = response.to_wire();
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.ends_with("\r\n\r\n[{\"id\":3}]"));
}
