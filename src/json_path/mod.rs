//! # JSON Path Lookups
//!
//! Dotted paths with optional indices, e.g. `data[0].email`. A key applied to
//! an array projects over its elements, so `title` on a list of posts yields
//! the list of titles. The empty path is the document root.

use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::JsonPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Ok(Self { segments });
        }

        for part in trimmed.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(start) => part.split_at(start),
                None => (part, ""),
            };

            if key.is_empty() && rest.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }

            while !rest.is_empty() {
                let body = rest
                    .strip_prefix('[')
                    .ok_or_else(|| invalid("unexpected text after index"))?;
                let end = body.find(']').ok_or_else(|| invalid("unclosed bracket"))?;
                let index = body[..end]
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| invalid("index must be a non-negative integer"))?;
                segments.push(Segment::Index(index));
                rest = &body[end + 1..];
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluate against `root`. `None` when any step does not resolve.
    pub fn find(&self, root: &Value) -> Option<Value> {
        let mut current = root.clone();
        for segment in &self.segments {
            current = step(current, segment)?;
        }
        Some(current)
    }
}

fn step(value: Value, segment: &Segment) -> Option<Value> {
    match (value, segment) {
        (Value::Object(mut map), Segment::Key(key)) => map.remove(key),
        (Value::Array(items), Segment::Key(key)) => Some(Value::Array(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(mut map) => map.remove(key),
                    _ => None,
                })
                .collect(),
        )),
        (Value::Array(mut items), Segment::Index(index)) => {
            if *index < items.len() {
                Some(items.swap_remove(*index))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Parse `path` and look it up in one go.
pub fn lookup(root: &Value, path: &str) -> Result<Option<Value>> {
    Ok(JsonPath::parse(path)?.find(root))
}
