use resty_core::client::{HttpClient, HttpResponse, RequestOptions, TransportError};
use resty_core::template::Verb;
use std::time::Duration;

/// A default HTTP client using `reqwest` blocking client.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl HttpClient for ReqwestClient {
    fn execute(
        &self,
        verb: Verb,
        url: &str,
        options: &RequestOptions<'_>,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = match verb {
            Verb::Get => self.client.get(url),
            Verb::Post => self.client.post(url),
        };

        for (k, v) in &options.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        if let Some(auth) = options.auth {
            builder = builder.basic_auth(&auth.user, Some(&auth.password));
        }

        if let Some(b) = &options.body {
            builder = builder.body(b.clone());
        }

        let response = builder
            .send()
            .map_err(|e| TransportError::new(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();

        let body = response
            .text()
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse::new(status, body))
    }
}
