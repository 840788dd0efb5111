use crate::template::{Auth, Verb};
use thiserror::Error;

/// Output of a completed HTTP request.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status in `200..300`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Everything besides the verb and URL needed to send a request.
///
/// The body is already serialized; transports send it as-is.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions<'a> {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub auth: Option<&'a Auth>,
}

/// The request never produced a response (DNS, refused connection, bad URL,
/// timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A generic interface to execute an HTTP request.
/// Implement this trait to plug a transport into the filter; the core never
/// talks to the network itself.
pub trait HttpClient {
    fn execute(
        &self,
        verb: Verb,
        url: &str,
        options: &RequestOptions<'_>,
    ) -> Result<HttpResponse, TransportError>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn execute(
        &self,
        verb: Verb,
        url: &str,
        options: &RequestOptions<'_>,
    ) -> Result<HttpResponse, TransportError> {
        (**self).execute(verb, url, options)
    }
}
