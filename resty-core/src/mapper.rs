//! Classifying HTTP outcomes and merging them into records.

use crate::client::{HttpResponse, TransportError};
use crate::codec;
use crate::path::FieldPath;
use crate::record::Record;
use crate::value::Value;

/// How a single request turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Success,
    /// 2xx whose parsed body has no entries.
    EmptySuccess,
    /// Status outside 200..300.
    HttpError,
    TransportError,
    /// 2xx whose body is not valid JSON.
    ParseError,
}

impl Classification {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Classification::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::EmptySuccess => "empty_success",
            Classification::HttpError => "http_error",
            Classification::TransportError => "transport_error",
            Classification::ParseError => "parse_error",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified result of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    /// `None` when no response was received.
    pub status_code: Option<u16>,
    pub raw_body: String,
    pub classification: Classification,
    pub parsed_value: Option<Value>,
    /// Transport or parse error message, for diagnostics.
    pub error: Option<String>,
}

impl ResponseOutcome {
    /// Classify an executor result.
    ///
    /// With `json` on a 2xx body is parsed, and an empty parse result counts
    /// as a failure. With `json` off the trimmed body text is the value.
    pub fn classify(result: Result<HttpResponse, TransportError>, json: bool) -> Self {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                return Self {
                    status_code: None,
                    raw_body: String::new(),
                    classification: Classification::TransportError,
                    parsed_value: None,
                    error: Some(err.to_string()),
                };
            }
        };

        let success = response.is_success();
        let mut outcome = Self {
            status_code: Some(response.status),
            raw_body: response.body,
            classification: Classification::HttpError,
            parsed_value: None,
            error: None,
        };
        if !success {
            return outcome;
        }

        if !json {
            outcome.parsed_value = Some(Value::String(outcome.raw_body.trim().to_string()));
            outcome.classification = Classification::Success;
            return outcome;
        }

        match codec::parse(&outcome.raw_body) {
            Ok(value) if value.is_empty() => {
                outcome.classification = Classification::EmptySuccess;
            }
            Ok(value) => {
                outcome.parsed_value = Some(value);
                outcome.classification = Classification::Success;
            }
            Err(err) => {
                outcome.classification = Classification::ParseError;
                outcome.error = Some(err.to_string());
            }
        }
        outcome
    }
}

/// What the mapper did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The response value was written to the target.
    Merged,
    /// The fallback was written to the target.
    FallbackMerged,
    /// Failure tags were appended; the target was not touched.
    Tagged,
}

/// Merges outcomes into records.
#[derive(Debug, Clone)]
pub struct ResponseMapper {
    target: FieldPath,
    fallback: Option<Value>,
    tag_on_rest_failure: Vec<String>,
    tag_on_json_failure: Vec<String>,
}

impl ResponseMapper {
    /// An empty `fallback` is treated as no fallback at all.
    pub fn new(
        target: FieldPath,
        fallback: Option<Value>,
        tag_on_rest_failure: Vec<String>,
        tag_on_json_failure: Vec<String>,
    ) -> Self {
        Self {
            target,
            fallback: fallback.filter(|v| !v.is_empty()),
            tag_on_rest_failure,
            tag_on_json_failure,
        }
    }

    pub fn target(&self) -> &FieldPath {
        &self.target
    }

    pub fn fallback(&self) -> Option<&Value> {
        self.fallback.as_ref()
    }

    pub fn apply<R: Record + ?Sized>(&self, outcome: ResponseOutcome, record: &mut R) -> Resolution {
        if let (Classification::Success, Some(value)) = (outcome.classification, outcome.parsed_value) {
            record.set(&self.target, value);
            return Resolution::Merged;
        }

        if let Some(fallback) = &self.fallback {
            record.set(&self.target, fallback.clone());
            return Resolution::FallbackMerged;
        }

        let tags = match outcome.classification {
            Classification::ParseError | Classification::EmptySuccess => &self.tag_on_json_failure,
            _ => &self.tag_on_rest_failure,
        };
        for tag in tags {
            record.tag(tag);
        }
        Resolution::Tagged
    }
}
