//! # Test Data
//!
//! JSON fixture files holding credentials, endpoints and small lists used to
//! parameterize checks, e.g.
//!
//! ```json
//! { "username": "postman", "password": "password", "endpoint": "/api/users",
//!   "languages": ["java", "python", "rust"] }
//! ```

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct TestData {
    values: Map<String, Value>,
}

impl TestData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match serde_json::from_str(raw)? {
            Value::Object(values) => Ok(Self { values }),
            other => Err(Error::InvalidRequest(format!(
                "Test data must be a JSON object, found {}",
                kind(&other)
            ))),
        }
    }

    /// Scalar value as text; strings are returned without quotes.
    pub fn get(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .map(render)
            .ok_or_else(|| Error::MissingKey(key.to_string()))
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn array(&self, key: &str) -> Result<&[Value]> {
        match self.values.get(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(Error::InvalidRequest(format!(
                "Test data `{key}` is {}, not an array",
                kind(other)
            ))),
            None => Err(Error::MissingKey(key.to_string())),
        }
    }

    pub fn array_item(&self, key: &str, index: usize) -> Result<String> {
        self.array(key)?
            .get(index)
            .map(render)
            .ok_or_else(|| Error::MissingKey(format!("{key}[{index}]")))
    }

    /// Entries as a variable map, for `{{var}}` interpolation.
    pub fn variables(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_array() && !value.is_object())
            .map(|(key, value)| (key.clone(), render(value)))
    }
}

pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
