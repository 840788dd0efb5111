//! Field references into a record: `message`, `[user][id]`, `[items][0]`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("field path must not be blank")]
    Empty,
    #[error("malformed field path `{0}`")]
    Malformed(String),
}

/// A normalized, non-empty field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a field reference.
    ///
    /// A bare name is a single top-level field (dots are not separators).
    /// The bracketed form addresses nested fields, one segment per pair.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        if !trimmed.starts_with('[') {
            if trimmed.contains(['[', ']']) {
                return Err(PathError::Malformed(raw.to_string()));
            }
            return Ok(Self {
                segments: vec![trimmed.to_string()],
            });
        }

        let mut segments = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('[')
                .ok_or_else(|| PathError::Malformed(raw.to_string()))?;
            let close = inner
                .find(']')
                .ok_or_else(|| PathError::Malformed(raw.to_string()))?;
            let segment = inner[..close].trim();
            if segment.is_empty() || segment.contains('[') {
                return Err(PathError::Malformed(raw.to_string()));
            }
            segments.push(segment.to_string());
            rest = &inner[close + 1..];
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The top-level field name.
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Segments below the top-level field.
    pub fn tail(&self) -> &[String] {
        &self.segments[1..]
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [single] = self.segments.as_slice() {
            return write!(f, "{}", single);
        }
        for segment in &self.segments {
            write!(f, "[{}]", segment)?;
        }
        Ok(())
    }
}
