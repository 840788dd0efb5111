//! Configuration for the REST filter.

use crate::error::ConfigError;
use crate::interpolation::MissingFieldPolicy;
use crate::template::RequestSpec;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Filter configuration, as loaded from YAML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestFilterConfig {
    /// A bare URL or a structured request
    pub request: RequestSpec,
    /// Parse responses and serialize request bodies as JSON
    #[serde(default = "default_true")]
    pub json: bool,
    /// Expand `%{field}` placeholders in the request
    #[serde(default)]
    pub sprintf: bool,
    /// Field the response is written to
    #[serde(default = "default_target")]
    pub target: String,
    /// Written to the target instead of tagging when a call fails
    #[serde(default)]
    pub fallback: Option<Value>,
    #[serde(default = "default_rest_failure_tags")]
    pub tag_on_rest_failure: Vec<String>,
    #[serde(default = "default_json_failure_tags")]
    pub tag_on_json_failure: Vec<String>,
    /// Expansion of placeholders whose field is absent
    #[serde(default)]
    pub missing_field: MissingFieldPolicy,
}

fn default_true() -> bool {
    true
}

fn default_target() -> String {
    "rest".to_string()
}

fn default_rest_failure_tags() -> Vec<String> {
    vec!["_restfailure".to_string()]
}

fn default_json_failure_tags() -> Vec<String> {
    vec!["_jsonparsefailure".to_string()]
}

impl RestFilterConfig {
    /// Configuration with defaults for everything but the request.
    pub fn new(request: RequestSpec) -> Self {
        Self {
            request,
            json: default_true(),
            sprintf: false,
            target: default_target(),
            fallback: None,
            tag_on_rest_failure: default_rest_failure_tags(),
            tag_on_json_failure: default_json_failure_tags(),
            missing_field: MissingFieldPolicy::default(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
