//! The REST enrichment filter: one templated HTTP call per record.

use crate::client::{HttpClient, RequestOptions};
use crate::codec;
use crate::config::RestFilterConfig;
use crate::error::ConfigError;
use crate::interpolation::{InterpolationIndex, MissingFieldPolicy};
use crate::mapper::{Classification, Resolution, ResponseMapper, ResponseOutcome};
use crate::materialize::{materialize, RuntimeRequest};
use crate::path::{FieldPath, PathError};
use crate::record::Record;
use crate::template::RequestTemplate;
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Summary of what happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub classification: Classification,
    pub resolution: Resolution,
    pub status_code: Option<u16>,
}

/// Enriches records with the result of a templated HTTP request.
///
/// The template and its interpolation index are built once in [`RestFilter::new`]
/// and only read afterwards, so a single filter can serve many threads.
#[derive(Debug, Clone)]
pub struct RestFilter {
    template: Arc<RequestTemplate>,
    index: InterpolationIndex,
    json: bool,
    missing_field: MissingFieldPolicy,
    mapper: ResponseMapper,
}

impl RestFilter {
    /// Validate `config` and build the filter.
    pub fn new(config: RestFilterConfig) -> Result<Self, ConfigError> {
        let target = FieldPath::parse(&config.target).map_err(|err| match err {
            PathError::Empty => ConfigError::BlankTarget,
            PathError::Malformed(raw) => ConfigError::InvalidTarget(raw),
        })?;
        let template = RequestTemplate::from_spec(&config.request)?;
        let index = if config.sprintf {
            InterpolationIndex::build(&template)?
        } else {
            InterpolationIndex::empty()
        };

        info!(
            verb = %template.verb,
            url = template.url_str(),
            target = %target,
            json = config.json,
            placeholders = index.len(),
            "REST filter initialized"
        );

        Ok(Self {
            template: Arc::new(template),
            index,
            json: config.json,
            missing_field: config.missing_field,
            mapper: ResponseMapper::new(
                target,
                config.fallback,
                config.tag_on_rest_failure,
                config.tag_on_json_failure,
            ),
        })
    }

    /// Build from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::new(RestFilterConfig::from_yaml(yaml)?)
    }

    /// Build from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(RestFilterConfig::from_json(json)?)
    }

    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    pub fn index(&self) -> &InterpolationIndex {
        &self.index
    }

    pub fn target(&self) -> &FieldPath {
        self.mapper.target()
    }

    /// The request `record` would send.
    pub fn materialize<R: Record + ?Sized>(&self, record: &R) -> RuntimeRequest<'_> {
        materialize(&self.template, &self.index, record, self.missing_field)
    }

    /// Headers, query and serialized body for a materialized request.
    pub fn request_options<'a>(&self, request: &'a RequestTemplate) -> RequestOptions<'a> {
        let mut headers: Vec<(String, String)> = request
            .headers()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.render())).collect())
            .unwrap_or_default();

        let query = request
            .params()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.render())).collect())
            .unwrap_or_default();

        let body = request.body.as_ref().map(|body| match body {
            Value::String(text) if !self.json => text.clone(),
            other => codec::serialize(other),
        });
        if body.is_some() && self.json && !request.has_header("content-type") {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        RequestOptions {
            headers,
            query,
            body,
            auth: request.auth.as_ref(),
        }
    }

    /// Run the request for `record` and merge the outcome into it.
    ///
    /// Never fails: every runtime problem ends as a fallback merge or a tag.
    pub fn filter<C, R>(&self, client: &C, record: &mut R) -> FilterReport
    where
        C: HttpClient + ?Sized,
        R: Record + ?Sized,
    {
        let request = self.materialize(&*record);
        let options = self.request_options(&request);
        let url = request.url_str();

        debug!(verb = %request.verb, url, "dispatching request");
        let result = client.execute(request.verb, url, &options);
        let outcome = ResponseOutcome::classify(result, self.json);

        if outcome.classification.is_failure() {
            warn!(
                verb = %request.verb,
                url,
                classification = %outcome.classification,
                status = ?outcome.status_code,
                body = %outcome.raw_body,
                error = ?outcome.error,
                "REST request failed"
            );
        }

        let classification = outcome.classification;
        let status_code = outcome.status_code;
        let resolution = self.mapper.apply(outcome, record);
        debug!(%classification, ?resolution, "record processed");

        FilterReport {
            classification,
            resolution,
            status_code,
        }
    }
}
