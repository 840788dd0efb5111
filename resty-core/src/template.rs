//! Request templates: the raw `request` configuration and its normalized,
//! immutable form.

use crate::error::ConfigError;
use crate::value::{Map, Value};
use serde::{Deserialize, Serialize};

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Verb {
    #[default]
    Get,
    Post,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            _ => Err(ConfigError::UnsupportedVerb(s.to_string())),
        }
    }
}

/// The `request` setting as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestSpec {
    /// A bare URL, fetched with GET.
    Url(String),
    Structured(StructuredRequest),
}

/// The object form of the `request` setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub auth: Option<AuthSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSpec {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, alias = "pass")]
    pub password: Option<String>,
}

/// Basic-auth credentials handed to the transport.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A normalized request, built once and shared read-only by every record.
///
/// `url` is always a [`Value::String`]; `headers` and `params`, when present,
/// are maps.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    pub verb: Verb,
    pub url: Value,
    pub headers: Option<Value>,
    pub params: Option<Value>,
    pub body: Option<Value>,
    pub auth: Option<Auth>,
}

impl RequestTemplate {
    /// Normalize a `request` setting.
    ///
    /// A POST with `params` but no `body` sends the params as its body.
    pub fn from_spec(spec: &RequestSpec) -> Result<Self, ConfigError> {
        let structured = match spec {
            RequestSpec::Url(url) => {
                return Ok(Self {
                    verb: Verb::Get,
                    url: Value::String(normalize_url(Some(url))?),
                    headers: None,
                    params: None,
                    body: None,
                    auth: None,
                });
            }
            RequestSpec::Structured(structured) => structured,
        };

        let verb = match &structured.method {
            Some(method) => method.parse()?,
            None => Verb::Get,
        };
        let url = normalize_url(structured.url.as_ref())?;
        let headers = normalize_headers(structured.headers.clone())?;
        let auth = structured.auth.as_ref().map(normalize_auth).transpose()?;

        let mut params = present(structured.params.clone());
        let mut body = present(structured.body.clone());
        if verb == Verb::Post && body.is_none() {
            body = params.take();
        }
        if let Some(params) = &params {
            if !matches!(params, Value::Map(_)) {
                return Err(ConfigError::InvalidParams(kind_of(params).to_string()));
            }
        }

        Ok(Self {
            verb,
            url: Value::String(url),
            headers,
            params,
            body,
            auth,
        })
    }

    /// The URL text. Empty only if `url` was replaced by a non-string.
    pub fn url_str(&self) -> &str {
        self.url.as_str().unwrap_or_default()
    }

    pub fn headers(&self) -> Option<&Map> {
        self.headers.as_ref().and_then(Value::as_map)
    }

    pub fn params(&self) -> Option<&Map> {
        self.params.as_ref().and_then(Value::as_map)
    }

    /// Whether a header named `name` is configured (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.headers()
            .is_some_and(|headers| headers.keys().any(|k| k.eq_ignore_ascii_case(name)))
    }
}

impl TryFrom<&RequestSpec> for RequestTemplate {
    type Error = ConfigError;

    fn try_from(spec: &RequestSpec) -> Result<Self, Self::Error> {
        Self::from_spec(spec)
    }
}

fn normalize_url(url: Option<&String>) -> Result<String, ConfigError> {
    let url = url.ok_or(ConfigError::MissingUrl)?;
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::BlankUrl);
    }
    Ok(url.to_string())
}

fn normalize_headers(headers: Option<Value>) -> Result<Option<Value>, ConfigError> {
    let Some(mut headers) = headers else {
        return Ok(None);
    };
    headers.prune_empty();
    match &headers {
        Value::Null => Ok(None),
        Value::Map(map) if map.is_empty() => Ok(None),
        Value::Map(map) => match map.iter().find(|(_, v)| !v.is_scalar()) {
            Some((name, value)) => Err(ConfigError::InvalidHeaders(format!(
                "{} for header `{}`",
                kind_of(value),
                name
            ))),
            None => Ok(Some(headers)),
        },
        other => Err(ConfigError::InvalidHeaders(kind_of(other).to_string())),
    }
}

fn normalize_auth(auth: &AuthSpec) -> Result<Auth, ConfigError> {
    let user = auth
        .user
        .clone()
        .ok_or(ConfigError::MissingCredential("user"))?;
    let password = auth
        .password
        .clone()
        .ok_or(ConfigError::MissingCredential("password"))?;
    Ok(Auth { user, password })
}

/// `None` for absent or explicitly null settings.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !matches!(v, Value::Null))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::List(_) => "a list",
        Value::Map(_) => "a map",
    }
}
