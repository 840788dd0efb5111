//! Per-record request materialization.

use crate::interpolation::{InterpolationIndex, MissingFieldPolicy};
use crate::record::Record;
use crate::template::RequestTemplate;
use crate::value::Value;
use std::borrow::Cow;

/// A request realized for one record.
///
/// Borrowed when the template has nothing to substitute, owned otherwise.
pub type RuntimeRequest<'a> = Cow<'a, RequestTemplate>;

/// Produce the request for `record`.
///
/// Only the leaves listed in `index` are rewritten; with an empty index the
/// template itself is handed back without copying.
pub fn materialize<'a, R: Record + ?Sized>(
    template: &'a RequestTemplate,
    index: &InterpolationIndex,
    record: &R,
    policy: MissingFieldPolicy,
) -> RuntimeRequest<'a> {
    if index.is_empty() {
        return Cow::Borrowed(template);
    }

    let mut request = template.clone();
    for leaf in index.leaves() {
        if let Some(Value::String(text)) = leaf.resolve_mut(&mut request) {
            *text = leaf.pattern.expand(record, policy);
        }
    }
    Cow::Owned(request)
}
