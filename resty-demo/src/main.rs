use resty_core::client::{HttpClient, HttpResponse, RequestOptions, TransportError};
use resty_core::{Event, RestFilter, Value, Verb};
use std::process;

const CONFIG: &str = include_str!("../enrich.yaml");

/// A simple Mock Client for demonstration.
/// It doesn't actually make HTTP requests, but returns canned responses.
pub struct ExampleMockClient;

impl HttpClient for ExampleMockClient {
    fn execute(
        &self,
        verb: Verb,
        url: &str,
        _options: &RequestOptions<'_>,
    ) -> Result<HttpResponse, TransportError> {
        println!(">>> [MOCK] Intercepted a {} request to '{}'", verb, url);

        match url.rsplit('/').next() {
            Some("1") => Ok(HttpResponse::new(200, r#"{"id": 1, "name": "Leanne Graham"}"#)),
            Some("2") => Ok(HttpResponse::new(404, "Not Found")),
            Some("") => Err(TransportError::new("connection refused")),
            _ => Ok(HttpResponse::new(200, "{}")),
        }
    }
}

fn main() {
    let filter = match RestFilter::from_yaml(CONFIG) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let records = [
        r#"{"message": "known user", "user_id": 1}"#,
        r#"{"message": "deleted user", "user_id": 2}"#,
        r#"{"message": "no user id"}"#,
        r#"{"message": "empty profile", "user_id": 3}"#,
    ];

    // We instantiate our custom mock client instead of reqwest
    let client = ExampleMockClient;

    println!("Enriching {} records with Mock Client...\n", records.len());
    for raw in records {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Bad record {}: {}", raw, e);
                continue;
            }
        };
        let Ok(mut event) = Event::try_from(value) else {
            continue;
        };

        let report = filter.filter(&client, &mut event);
        println!("    {} -> {:?}", report.classification, report.resolution);
        match serde_json::to_string(&event) {
            Ok(json) => println!("    {}\n", json),
            Err(e) => eprintln!("    failed to render record: {}\n", e),
        }
    }
}
