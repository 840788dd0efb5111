#![allow(dead_code)]

use resty_core::client::{HttpClient, HttpResponse, RequestOptions, TransportError};
use resty_core::{Event, FieldPath, Value, Verb};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub auth: Option<(String, String)>,
}

/// Records every request and answers with `respond(url)`.
pub struct MockClient<F> {
    respond: F,
    pub calls: Mutex<Vec<CapturedRequest>>,
}

impl<F> MockClient<F>
where
    F: Fn(&str) -> Result<HttpResponse, TransportError>,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn last(&self) -> CapturedRequest {
        self.calls.lock().unwrap().last().cloned().expect("no request was sent")
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl<F> HttpClient for MockClient<F>
where
    F: Fn(&str) -> Result<HttpResponse, TransportError>,
{
    fn execute(
        &self,
        verb: Verb,
        url: &str,
        options: &RequestOptions<'_>,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(CapturedRequest {
            verb,
            url: url.to_string(),
            headers: options.headers.clone(),
            query: options.query.clone(),
            body: options.body.clone(),
            auth: options.auth.map(|a| (a.user.clone(), a.password.clone())),
        });
        (self.respond)(url)
    }
}

/// A client that always answers `status` with `body`.
pub fn always(
    status: u16,
    body: &'static str,
) -> MockClient<impl Fn(&str) -> Result<HttpResponse, TransportError>> {
    MockClient::new(move |_: &str| Ok(HttpResponse::new(status, body)))
}

/// A client whose every call fails before a response arrives.
pub fn refusing() -> MockClient<impl Fn(&str) -> Result<HttpResponse, TransportError>> {
    MockClient::new(|url: &str| Err(TransportError::new(format!("connection refused: {}", url))))
}

pub fn event(value: serde_json::Value) -> Event {
    Event::try_from(Value::from(value)).expect("records are JSON objects")
}

pub fn path(raw: &str) -> FieldPath {
    FieldPath::parse(raw).unwrap()
}

pub fn get<'a>(event: &'a Event, raw: &str) -> Option<&'a Value> {
    use resty_core::Record;
    event.get(&path(raw))
}
