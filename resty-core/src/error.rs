//! Configuration errors raised while building a filter.

use thiserror::Error;

/// A problem with the filter configuration.
///
/// All of these surface while the filter is being constructed; none is ever
/// raised while processing a record.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("request is missing a `url`")]
    MissingUrl,

    #[error("request `url` must not be blank")]
    BlankUrl,

    #[error("unsupported request method `{0}` (expected `get` or `post`)")]
    UnsupportedVerb(String),

    #[error("request auth is missing the `{0}` credential")]
    MissingCredential(&'static str),

    #[error("request headers must be a map of scalar values, got {0}")]
    InvalidHeaders(String),

    #[error("request params must be a map when sent as a query string, got {0}")]
    InvalidParams(String),

    #[error("placeholder `{0}` does not reference a valid field")]
    InvalidPlaceholder(String),

    #[error("`target` must not be blank")]
    BlankTarget,

    #[error("invalid `target`: {0}")]
    InvalidTarget(String),

    #[error("failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
