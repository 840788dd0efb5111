//! Templated REST enrichment for pipeline records.
//!
//! A [`RestFilter`] turns its `request` configuration into an immutable
//! [`RequestTemplate`] once, indexes the `%{field}` placeholders inside it,
//! and then for every record:
//!
//! - materializes the request, copying the template only when it has
//!   placeholders,
//! - sends it through an [`HttpClient`],
//! - writes the parsed response (or the configured fallback) to the target
//!   field, or tags the record when the call failed.
//!
//! ## Configuration Example
//!
//! ```yaml
//! request:
//!   url: "http://users.internal/users/%{uid}"
//!   headers:
//!     Accept: application/json
//! sprintf: true
//! target: user
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod interpolation;
pub mod mapper;
pub mod materialize;
pub mod path;
pub mod record;
pub mod template;
pub mod value;

pub use client::{HttpClient, HttpResponse, RequestOptions, TransportError};
pub use config::RestFilterConfig;
pub use error::ConfigError;
pub use filter::{FilterReport, RestFilter};
pub use interpolation::{InterpolationIndex, MissingFieldPolicy};
pub use mapper::{Classification, Resolution, ResponseOutcome};
pub use materialize::RuntimeRequest;
pub use path::FieldPath;
pub use record::{Event, Record};
pub use template::{RequestSpec, RequestTemplate, Verb};
pub use value::Value;
