//! Generic value tree shared by request templates, records and responses.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered map of field name to value.
pub type Map = IndexMap<String, Value>;

/// A recursive value: null, boolean, number, string, list or map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// `true` for null, the empty string, and lists or maps without entries.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Number(_) | Value::String(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Recursively drop null entries and containers left empty afterwards.
    ///
    /// Empty strings are kept: they are values, not holes.
    pub fn prune_empty(&mut self) {
        match self {
            Value::List(items) => {
                items.iter_mut().for_each(Value::prune_empty);
                items.retain(|item| !is_hole(item));
            }
            Value::Map(map) => {
                map.values_mut().for_each(Value::prune_empty);
                map.retain(|_, item| !is_hole(item));
            }
            _ => {}
        }
    }

    /// Render as the text substituted into a placeholder.
    ///
    /// Strings are inserted verbatim, other scalars use their JSON text,
    /// null renders empty and containers render as compact JSON.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => serde_json::Value::from(self).to_string(),
        }
    }

    /// Follow `segments` through maps (by key) and lists (by index).
    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        let mut current = self;
        for segment in segments {
            let segment = segment.as_ref();
            current = match current {
                Value::Map(map) => map.get(segment)?,
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Store `value` at `segments`, creating intermediate maps.
    ///
    /// Existing list elements are addressed by index, and an index one past
    /// the end appends. Any other list index leaves the list alone and
    /// nothing is written. Scalars in the way are replaced by a map.
    ///
    /// Returns whether `value` was stored.
    pub fn set_path<S: AsRef<str>>(&mut self, segments: &[S], value: Value) -> bool {
        let Some((last, parents)) = segments.split_last() else {
            *self = value;
            return true;
        };

        let mut current = self;
        for segment in parents {
            match child_or_insert(current, segment.as_ref()) {
                Some(child) => current = child,
                None => return false,
            }
        }

        make_container(current);
        match current {
            Value::List(items) => match list_slot(items, last.as_ref()) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            Value::Map(map) => {
                map.insert(last.as_ref().to_string(), value);
                true
            }
            _ => false,
        }
    }
}

fn is_hole(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        _ => false,
    }
}

fn make_container(value: &mut Value) {
    if !matches!(value, Value::List(_) | Value::Map(_)) {
        *value = Value::Map(Map::new());
    }
}

/// `items[segment]`, appending a null slot when the index is one past the end.
fn list_slot<'a>(items: &'a mut Vec<Value>, segment: &str) -> Option<&'a mut Value> {
    let index = segment.parse::<usize>().ok()?;
    if index == items.len() {
        items.push(Value::Null);
    }
    items.get_mut(index)
}

fn child_or_insert<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    make_container(current);
    match current {
        Value::List(items) => list_slot(items, segment),
        Value::Map(map) => Some(
            map.entry(segment.to_string())
                .or_insert_with(|| Value::Map(Map::new())),
        ),
        _ => None,
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}
