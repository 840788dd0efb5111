//! `%{field}` placeholders: locating them in a template and expanding them
//! against a record.

use crate::error::ConfigError;
use crate::path::FieldPath;
use crate::record::Record;
use crate::template::RequestTemplate;
use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Regex for placeholders like %{message} or %{[user][id]}
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%\{([^}]+)\}").unwrap());

/// Whether `text` contains at least one placeholder.
pub fn has_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// What a placeholder expands to when its field is absent from the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Expand to the empty string.
    #[default]
    Empty,
    /// Leave the placeholder text in place.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field { path: FieldPath, raw: String },
}

/// A string split into literal text and parsed `%{field}` references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pieces: Vec<Piece>,
}

impl Pattern {
    /// Split `text` at its placeholders.
    ///
    /// Fails when a placeholder does not hold a valid field reference.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut pieces = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                pieces.push(Piece::Literal(text[last..whole.start()].to_string()));
            }
            let path = FieldPath::parse(&caps[1])
                .map_err(|_| ConfigError::InvalidPlaceholder(whole.as_str().to_string()))?;
            pieces.push(Piece::Field {
                path,
                raw: whole.as_str().to_string(),
            });
            last = whole.end();
        }
        if last < text.len() {
            pieces.push(Piece::Literal(text[last..].to_string()));
        }
        Ok(Self { pieces })
    }

    /// Expand every placeholder with the record's field values.
    ///
    /// The result is always a string, even when the field holds a number.
    pub fn expand<R: Record + ?Sized>(&self, record: &R, policy: MissingFieldPolicy) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Field { path, raw } => match (record.get(path), policy) {
                    (Some(value), _) => out.push_str(&value.render()),
                    (None, MissingFieldPolicy::Empty) => {}
                    (None, MissingFieldPolicy::Keep) => out.push_str(raw),
                },
            }
        }
        out
    }
}

/// The part of a request template a leaf lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplatePart {
    Url,
    Headers,
    Params,
    Body,
}

impl TemplatePart {
    pub const ALL: [TemplatePart; 4] = [
        TemplatePart::Url,
        TemplatePart::Headers,
        TemplatePart::Params,
        TemplatePart::Body,
    ];

    pub fn of(self, template: &RequestTemplate) -> Option<&Value> {
        match self {
            TemplatePart::Url => Some(&template.url),
            TemplatePart::Headers => template.headers.as_ref(),
            TemplatePart::Params => template.params.as_ref(),
            TemplatePart::Body => template.body.as_ref(),
        }
    }

    pub fn of_mut(self, template: &mut RequestTemplate) -> Option<&mut Value> {
        match self {
            TemplatePart::Url => Some(&mut template.url),
            TemplatePart::Headers => template.headers.as_mut(),
            TemplatePart::Params => template.params.as_mut(),
            TemplatePart::Body => template.body.as_mut(),
        }
    }
}

/// One step down a value tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Location of a placeholder-bearing string leaf inside a template, with
/// the leaf's text already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPath {
    pub part: TemplatePart,
    pub steps: Vec<Step>,
    pub pattern: Pattern,
}

impl LeafPath {
    pub fn resolve<'a>(&self, template: &'a RequestTemplate) -> Option<&'a Value> {
        let mut current = self.part.of(template)?;
        for step in &self.steps {
            current = match (current, step) {
                (Value::Map(map), Step::Key(key)) => map.get(key)?,
                (Value::List(items), Step::Index(i)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn resolve_mut<'a>(&self, template: &'a mut RequestTemplate) -> Option<&'a mut Value> {
        let mut current = self.part.of_mut(template)?;
        for step in &self.steps {
            current = match (current, step) {
                (Value::Map(map), Step::Key(key)) => map.get_mut(key)?,
                (Value::List(items), Step::Index(i)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Every leaf of a template that needs per-record substitution.
///
/// Built once from the template; leaves are listed in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpolationIndex {
    leaves: Vec<LeafPath>,
}

impl InterpolationIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk the url, headers, params and body of `template`.
    pub fn build(template: &RequestTemplate) -> Result<Self, ConfigError> {
        let mut leaves = Vec::new();
        for part in TemplatePart::ALL {
            if let Some(value) = part.of(template) {
                collect(value, part, &mut Vec::new(), &mut leaves)?;
            }
        }
        Ok(Self { leaves })
    }

    pub fn leaves(&self) -> &[LeafPath] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

fn collect(
    value: &Value,
    part: TemplatePart,
    steps: &mut Vec<Step>,
    out: &mut Vec<LeafPath>,
) -> Result<(), ConfigError> {
    match value {
        Value::String(s) if has_placeholder(s) => out.push(LeafPath {
            part,
            steps: steps.clone(),
            pattern: Pattern::parse(s)?,
        }),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                steps.push(Step::Index(i));
                collect(item, part, steps, out)?;
                steps.pop();
            }
        }
        Value::Map(map) => {
            for (key, item) in map {
                steps.push(Step::Key(key.clone()));
                collect(item, part, steps, out)?;
                steps.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Event;
    use crate::template::RequestSpec;
    use serde_json::json;

    fn template(spec: serde_json::Value) -> RequestTemplate {
        let spec: RequestSpec = serde_json::from_value(spec).unwrap();
        RequestTemplate::from_spec(&spec).unwrap()
    }

    fn event(value: serde_json::Value) -> Event {
        Event::try_from(Value::from(value)).unwrap()
    }

    #[test]
    fn test_has_placeholder() {
        assert!(has_placeholder("http://host/%{id}"));
        assert!(has_placeholder("%{[user][id]}-%{x}"));
        assert!(!has_placeholder("http://host/{id}"));
        assert!(!has_placeholder("100%"));
        assert!(!has_placeholder("%{}"));
    }

    #[test]
    fn test_static_template_has_empty_index() {
        let t = template(json!({
            "url": "http://host/users/10",
            "headers": { "Accept": "application/json" },
            "params": { "page": 1 }
        }));
        assert!(InterpolationIndex::build(&t).unwrap().is_empty());
    }

    #[test]
    fn test_index_lists_only_placeholder_leaves() {
        let t = template(json!({
            "url": "http://host/users/%{uid}",
            "method": "post",
            "headers": { "X-Request": "%{request_id}", "Accept": "application/json" },
            "body": {
                "key1": [{ "filterType": "text", "boolean": false }],
                "key2": [{ "message": "123%{message}" }],
                "key3": [{ "text": "%{message}123", "number": 44 }, { "null": null }],
                "userId": "%{message}"
            }
        }));
        let index = InterpolationIndex::build(&t).unwrap();

        assert_eq!(index.len(), 5);
        for leaf in index.leaves() {
            let text = leaf.resolve(&t).and_then(Value::as_str).unwrap();
            assert!(has_placeholder(text), "leaf {:?} resolved to {}", leaf, text);
        }
        assert_eq!(index.leaves()[3].part, TemplatePart::Body);
        assert_eq!(
            index.leaves()[3].steps,
            [Step::Key("key3".into()), Step::Index(0), Step::Key("text".into())]
        );
        assert_eq!(index.leaves()[0].part, TemplatePart::Url);
        assert!(index.leaves()[0].steps.is_empty());
    }

    fn expand(text: &str, ev: &Event, policy: MissingFieldPolicy) -> String {
        Pattern::parse(text).unwrap().expand(ev, policy)
    }

    #[test]
    fn test_expand_present_fields() {
        let ev = event(json!({ "uid": "9", "count": 3, "user": { "name": "ann" } }));
        assert_eq!(
            expand("/u/%{uid}/%{count}/%{[user][name]}", &ev, MissingFieldPolicy::Empty),
            "/u/9/3/ann"
        );
    }

    #[test]
    fn test_expand_missing_field_policies() {
        let ev = event(json!({}));
        assert_eq!(expand("id=%{missing}", &ev, MissingFieldPolicy::Empty), "id=");
        assert_eq!(
            expand("id=%{missing}", &ev, MissingFieldPolicy::Keep),
            "id=%{missing}"
        );
    }

    #[test]
    fn test_expand_leaves_plain_text_alone() {
        let ev = event(json!({ "message": "x" }));
        assert_eq!(expand("no placeholders", &ev, MissingFieldPolicy::Empty), "no placeholders");
    }

    #[test]
    fn test_malformed_field_reference_is_rejected() {
        assert!(matches!(
            Pattern::parse("http://h/%{[a}"),
            Err(ConfigError::InvalidPlaceholder(raw)) if raw == "%{[a}"
        ));

        let t = template(json!({ "url": "http://h", "headers": { "X-Id": "%{[a]b}" } }));
        assert!(matches!(
            InterpolationIndex::build(&t),
            Err(ConfigError::InvalidPlaceholder(_))
        ));
    }
}
