mod common;

use common::{always, event, get, refusing, MockClient};
use resty_core::{
    Classification, ConfigError, HttpResponse, Resolution, RestFilter, RestFilterConfig,
    TransportError, Value,
};
use serde_json::json;

const REST_TAGS: [&str; 2] = ["_restfailure", "_upstream"];
const JSON_TAGS: [&str; 1] = ["_jsonparsefailure"];

fn config(fallback: Option<serde_json::Value>) -> RestFilterConfig {
    let mut config = RestFilterConfig::from_yaml(
        r#"
request:
  url: "http://host/users/%{uid}"
sprintf: true
target: out
tag_on_rest_failure: ["_restfailure", "_upstream"]
"#,
    )
    .unwrap();
    config.fallback = fallback.map(Value::from);
    config
}

/// One client per failure class, paired with the class it should produce.
fn failing_clients() -> Vec<(
    Classification,
    MockClient<Box<dyn Fn(&str) -> Result<HttpResponse, TransportError>>>,
)> {
    let boxed = |f: Box<dyn Fn(&str) -> Result<HttpResponse, TransportError>>| MockClient::new(f);
    vec![
        (
            Classification::HttpError,
            boxed(Box::new(|_: &str| Ok(HttpResponse::new(404, "Not Found")))),
        ),
        (
            Classification::HttpError,
            boxed(Box::new(|_: &str| Ok(HttpResponse::new(503, r#"{"error": "down"}"#)))),
        ),
        (
            Classification::TransportError,
            boxed(Box::new(|_: &str| Err(TransportError::new("dns lookup failed")))),
        ),
        (
            Classification::ParseError,
            boxed(Box::new(|_: &str| Ok(HttpResponse::new(200, "<html>oops</html>")))),
        ),
        (
            Classification::EmptySuccess,
            boxed(Box::new(|_: &str| Ok(HttpResponse::new(200, "{}")))),
        ),
        (
            Classification::EmptySuccess,
            boxed(Box::new(|_: &str| Ok(HttpResponse::new(200, "[]")))),
        ),
    ]
}

#[test]
fn test_http_error_without_fallback_tags_record() {
    let filter = RestFilter::new(config(None)).unwrap();
    let client = always(404, "Not Found");
    let mut ev = event(json!({ "uid": "0", "message": "some text" }));

    let report = filter.filter(&client, &mut ev);

    assert_eq!(report.classification, Classification::HttpError);
    assert_eq!(report.resolution, Resolution::Tagged);
    assert_eq!(report.status_code, Some(404));
    assert!(get(&ev, "out").is_none());
    assert!(ev.has_tag("_restfailure"));
    assert_eq!(get(&ev, "message"), Some(&Value::from("some text")));
}

#[test]
fn test_transport_error_uses_fallback() {
    let filter = RestFilter::new(config(Some(json!({ "a": 1, "b": 2 })))).unwrap();
    let client = refusing();
    let mut ev = event(json!({ "uid": "1" }));

    let report = filter.filter(&client, &mut ev);

    assert_eq!(report.classification, Classification::TransportError);
    assert_eq!(report.resolution, Resolution::FallbackMerged);
    assert_eq!(report.status_code, None);
    assert_eq!(get(&ev, "out"), Some(&Value::from(json!({ "a": 1, "b": 2 }))));
    assert!(ev.tags().is_empty());
}

#[test]
fn test_every_failure_with_fallback_merges_fallback_exactly() {
    let fallback = json!({ "fallback1": true, "fallback2": true });
    let filter = RestFilter::new(config(Some(fallback.clone()))).unwrap();

    for (expected, client) in failing_clients() {
        let mut ev = event(json!({ "uid": "7", "out": { "stale": true } }));
        let report = filter.filter(&client, &mut ev);

        assert_eq!(report.classification, expected);
        assert_eq!(report.resolution, Resolution::FallbackMerged);
        assert_eq!(get(&ev, "out"), Some(&Value::from(fallback.clone())));
        assert!(ev.tags().is_empty(), "{} should not tag", expected);
    }
}

#[test]
fn test_every_failure_without_fallback_tags_and_leaves_target() {
    let filter = RestFilter::new(config(None)).unwrap();

    for (expected, client) in failing_clients() {
        let mut untouched = event(json!({ "uid": "7", "out": "previous" }));
        let report = filter.filter(&client, &mut untouched);
        assert_eq!(report.classification, expected);
        assert_eq!(report.resolution, Resolution::Tagged);
        assert_eq!(get(&untouched, "out"), Some(&Value::from("previous")));

        let mut absent = event(json!({ "uid": "7" }));
        filter.filter(&client, &mut absent);
        assert!(get(&absent, "out").is_none(), "{} created the target", expected);

        let expected_tags: &[&str] = match expected {
            Classification::ParseError | Classification::EmptySuccess => &JSON_TAGS,
            _ => &REST_TAGS,
        };
        for ev in [&untouched, &absent] {
            assert_eq!(ev.tags(), expected_tags, "tags for {}", expected);
        }
    }
}

#[test]
fn test_tagging_keeps_existing_non_list_tags() {
    let filter = RestFilter::new(config(None)).unwrap();
    let mut ev = event(json!({ "uid": "1", "tags": { "a": 1 } }));

    filter.filter(&always(404, "Not Found"), &mut ev);

    assert_eq!(
        get(&ev, "tags"),
        Some(&Value::from(json!([{ "a": 1 }, "_restfailure", "_upstream"])))
    );
}

#[test]
fn test_empty_fallback_behaves_like_no_fallback() {
    for empty in [json!({}), json!([]), json!(""), json!(null)] {
        let filter = RestFilter::new(config(Some(empty))).unwrap();
        let mut ev = event(json!({ "uid": "1" }));

        let report = filter.filter(&always(500, "boom"), &mut ev);

        assert_eq!(report.resolution, Resolution::Tagged);
        assert!(get(&ev, "out").is_none());
    }
}

#[test]
fn test_each_record_makes_exactly_one_attempt() {
    let filter = RestFilter::new(config(None)).unwrap();
    let client = refusing();
    for uid in ["1", "2", "3"] {
        let mut ev = event(json!({ "uid": uid }));
        filter.filter(&client, &mut ev);
    }
    assert_eq!(client.call_count(), 3);
}

#[test]
fn test_missing_field_policy() {
    let filter = RestFilter::new(config(None)).unwrap();
    let client = always(200, r#"{"id": 1}"#);
    let mut ev = event(json!({}));
    filter.filter(&client, &mut ev);
    assert_eq!(client.last().url, "http://host/users/");

    let mut keep = config(None);
    keep.missing_field = resty_core::MissingFieldPolicy::Keep;
    let filter = RestFilter::new(keep).unwrap();
    let client = always(200, r#"{"id": 1}"#);
    let mut ev = event(json!({}));
    filter.filter(&client, &mut ev);
    assert_eq!(client.last().url, "http://host/users/%{uid}");
}

#[test]
fn test_blank_target_fails_construction_not_processing() {
    let yaml = r#"
request:
  url: "http://host/users/0"
fallback:
  fallback1: true
target: ""
"#;
    assert!(matches!(
        RestFilter::from_yaml(yaml),
        Err(ConfigError::BlankTarget)
    ));
}

#[test]
fn test_configuration_errors() {
    let cases = [
        ("request:\n  method: get\n", "missing url"),
        ("request:\n  url: http://h\n  method: put\n", "unsupported verb"),
        ("request:\n  url: http://h\n  auth:\n    user: u\n", "missing password"),
        ("request:\n  url: http://h\n  auth:\n    password: p\n", "missing user"),
        ("request:\n  url: http://h\n  headers: [1, 2]\n", "bad headers"),
        ("request: http://h\ntarget: \"[a\"\n", "bad target"),
        ("request: \"http://h/%{[a}\"\nsprintf: true\n", "malformed placeholder"),
        ("json: true\n", "no request"),
    ];
    for (yaml, label) in cases {
        let result = RestFilter::from_yaml(yaml);
        assert!(result.is_err(), "{} should be rejected", label);
    }

    let err = RestFilter::from_yaml("request:\n  url: http://h\n  auth:\n    user: u\n")
        .unwrap_err();
    assert_eq!(err.to_string(), "request auth is missing the `password` credential");

    assert!(matches!(
        RestFilter::from_yaml("request: \"http://h/%{[a}\"\nsprintf: true\n"),
        Err(ConfigError::InvalidPlaceholder(raw)) if raw == "%{[a}"
    ));
    assert!(RestFilter::from_yaml("request: \"http://h/%{[a}\"\n").is_ok());
}
