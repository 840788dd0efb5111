//! Records flowing through the pipeline.

use crate::path::FieldPath;
use crate::value::{Map, Value};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name of the field holding an event's tags.
pub const TAGS_FIELD: &str = "tags";

/// A record the filter can read from, write into and tag.
///
/// The pipeline runtime owns records; the filter only borrows them for the
/// duration of one call.
pub trait Record {
    fn get(&self, path: &FieldPath) -> Option<&Value>;

    /// Store `value` at `path`, overwriting whatever was there.
    ///
    /// A list index that cannot be reached leaves the record unchanged.
    fn set(&mut self, path: &FieldPath, value: Value);

    /// Append `tag` to the record's tags unless already present.
    fn tag(&mut self, tag: &str);
}

/// A map-backed record, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &Map {
        &self.fields
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }

    pub fn tags(&self) -> Vec<&str> {
        match self.fields.get(TAGS_FIELD) {
            Some(Value::List(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(tag)) => vec![tag.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }
}

impl From<Map> for Event {
    fn from(fields: Map) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Event {
    type Error = Value;

    /// Only maps become events; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(fields) => Ok(Self { fields }),
            other => Err(other),
        }
    }
}

impl Record for Event {
    fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.fields.get(path.head())?.get_path(path.tail())
    }

    fn set(&mut self, path: &FieldPath, value: Value) {
        let tail = path.tail();
        if tail.is_empty() {
            self.fields.insert(path.head().to_string(), value);
            return;
        }
        let stored = self
            .fields
            .entry(path.head().to_string())
            .or_insert_with(|| Value::Map(Map::new()))
            .set_path(tail, value);
        if !stored {
            warn!(path = %path, "list index out of range, field not written");
        }
    }

    fn tag(&mut self, tag: &str) {
        let tags = self
            .fields
            .entry(TAGS_FIELD.to_string())
            .or_insert_with(|| Value::List(Vec::new()));

        // Whatever was stored before becomes the first element.
        if !matches!(tags, Value::List(_)) {
            *tags = match std::mem::take(tags) {
                Value::Null => Value::List(Vec::new()),
                existing => Value::List(vec![existing]),
            };
        }
        if let Value::List(items) = tags {
            if !items.iter().any(|item| item.as_str() == Some(tag)) {
                items.push(Value::from(tag));
            }
        }
    }
}
