use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::ApiResponse;

use super::soft::{AssertionFailure, SoftAssertions};
use super::value::{CheckValue, Comparison};

/// Target of an assertion within the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum AssertionTarget {
    Status,
    Header { name: String },
    Cookie { name: String },
    JsonPath { path: String },
    Body,
}

/// Comparison operator for an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    Exists,
    HasSize,
    HasItems,
    ContainsInOrder,
}

/// A single declarative check evaluated against a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(flatten)]
    pub target: AssertionTarget,
    pub operator: AssertionOperator,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Result of evaluating an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub assertion: Assertion,
    pub passed: bool,
    pub actual: Option<String>,
    pub message: String,
}

impl Display for AssertionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionTarget::Status => write!(f, "status"),
            AssertionTarget::Header { name } => write!(f, "header {name}"),
            AssertionTarget::Cookie { name } => write!(f, "cookie {name}"),
            AssertionTarget::JsonPath { path } => write!(f, "json_path {path}"),
            AssertionTarget::Body => write!(f, "body"),
        }
    }
}

impl Display for AssertionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssertionOperator::Equals => "equals",
            AssertionOperator::NotEquals => "not_equals",
            AssertionOperator::Contains => "contains",
            AssertionOperator::GreaterThan => "greater_than",
            AssertionOperator::LessThan => "less_than",
            AssertionOperator::Exists => "exists",
            AssertionOperator::HasSize => "has_size",
            AssertionOperator::HasItems => "has_items",
            AssertionOperator::ContainsInOrder => "contains_in_order",
        };
        write!(f, "{label}")
    }
}

impl AssertionTarget {
    fn extract(&self, response: &ApiResponse) -> Result<Option<CheckValue>> {
        Ok(match self {
            AssertionTarget::Status => Some(CheckValue::from(response.status)),
            AssertionTarget::Header { name } => response.header(name).map(CheckValue::from),
            AssertionTarget::Cookie { name } => response.cookie(name).map(CheckValue::from),
            AssertionTarget::JsonPath { path } => response.json_path(path)?.map(CheckValue::from),
            AssertionTarget::Body => Some(CheckValue::from(response.body.as_str())),
        })
    }
}

impl Assertion {
    pub fn new(target: AssertionTarget, operator: AssertionOperator, value: impl Into<Value>) -> Self {
        Self {
            target,
            operator,
            value: value.into(),
            description: None,
        }
    }

    pub fn status(code: u16) -> Self {
        Self::new(AssertionTarget::Status, AssertionOperator::Equals, code)
    }

    pub fn json_path(path: &str, operator: AssertionOperator, value: impl Into<Value>) -> Self {
        Self::new(
            AssertionTarget::JsonPath {
                path: path.to_string(),
            },
            operator,
            value,
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Label used as the failure description.
    pub fn label(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.target, self.operator))
    }

    /// Evaluate against `response`, recording any failure into `soft`.
    pub fn evaluate(&self, response: &ApiResponse, soft: &mut SoftAssertions) -> AssertionResult {
        let label = self.label();
        let before = soft.failure_count();

        let actual = match self.target.extract(response) {
            Ok(actual) => {
                self.apply(actual.clone(), soft, &label);
                actual
            }
            Err(err) => {
                soft.record(AssertionFailure::new(
                    &label,
                    CheckValue::Null,
                    Some(CheckValue::from(self.value.clone())),
                    format!("could not read {}: {err}", self.target),
                ));
                None
            }
        };

        let passed = soft.failure_count() == before;
        let message = if passed {
            format!("{label}: passed")
        } else {
            soft.failures()
                .last()
                .map(|failure| failure.message.clone())
                .unwrap_or_default()
        };

        AssertionResult {
            assertion: self.clone(),
            passed,
            actual: actual.map(|value| value.to_string()),
            message,
        }
    }

    fn apply(&self, actual: Option<CheckValue>, soft: &mut SoftAssertions, label: &str) {
        let expected = CheckValue::from(self.value.clone());

        match self.operator {
            AssertionOperator::Equals => {
                soft.assert_equals(actual.unwrap_or(CheckValue::Null), expected, label);
            }
            AssertionOperator::NotEquals => {
                soft.assert_not_equals(actual.unwrap_or(CheckValue::Null), expected, label);
            }
            AssertionOperator::Exists => {
                let should_exist = self.value.as_bool().unwrap_or(true);
                match (should_exist, actual) {
                    (true, None) => soft.record(AssertionFailure::new(
                        label,
                        CheckValue::Null,
                        None,
                        "expected a value but got none",
                    )),
                    (false, Some(found)) => {
                        let explanation = format!("expected no value but got {found}");
                        soft.record(AssertionFailure::new(label, found, None, explanation));
                    }
                    _ => {}
                }
            }
            AssertionOperator::Contains => {
                let actual = actual.unwrap_or(CheckValue::Null);
                if !contains(&actual, &expected) {
                    let explanation =
                        format!("expected a value containing {expected} but got {actual}");
                    soft.record(AssertionFailure::new(label, actual, Some(expected), explanation));
                }
            }
            AssertionOperator::GreaterThan | AssertionOperator::LessThan => {
                let actual = actual.unwrap_or(CheckValue::Null);
                let (wanted, relation) = if self.operator == AssertionOperator::GreaterThan {
                    (Ordering::Greater, "greater than")
                } else {
                    (Ordering::Less, "less than")
                };
                if actual.partial_order(&expected) != Some(wanted) {
                    let explanation = format!("expected a value {relation} {expected} but got {actual}");
                    soft.record(AssertionFailure::new(label, actual, Some(expected), explanation));
                }
            }
            AssertionOperator::HasSize => match actual.as_ref().and_then(size_of) {
                Some(size) => soft.assert_equals(size, expected, label),
                None => {
                    let actual = actual.unwrap_or(CheckValue::Null);
                    let explanation = format!(
                        "expected a collection of size {expected} but got {actual} ({})",
                        actual.kind()
                    );
                    soft.record(AssertionFailure::new(label, actual, Some(expected), explanation));
                }
            },
            AssertionOperator::HasItems => {
                let wanted = match &self.value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let found = match &actual {
                    Some(CheckValue::Json(Value::Array(items))) => items.as_slice(),
                    _ => &[],
                };
                let missing: Vec<Value> = wanted
                    .into_iter()
                    .filter(|item| !found.iter().any(|candidate| same(candidate, item)))
                    .collect();
                if !missing.is_empty() {
                    let actual = actual.unwrap_or(CheckValue::Null);
                    let explanation = format!(
                        "expected items {} but missing {}",
                        self.value,
                        Value::Array(missing)
                    );
                    soft.record(AssertionFailure::new(label, actual, Some(expected), explanation));
                }
            }
            AssertionOperator::ContainsInOrder => {
                soft.assert_equals(actual.unwrap_or(CheckValue::Null), expected, label);
            }
        }
    }
}

fn same(a: &Value, b: &Value) -> bool {
    CheckValue::from(a).compare(&CheckValue::from(b)) == Comparison::Equal
}

fn contains(actual: &CheckValue, expected: &CheckValue) -> bool {
    match (actual, expected) {
        (CheckValue::Str(haystack), needle) => haystack.contains(&needle.to_string()),
        (CheckValue::Json(Value::Array(items)), needle) => items
            .iter()
            .any(|item| CheckValue::from(item).compare(needle) == Comparison::Equal),
        (CheckValue::Json(Value::Object(map)), CheckValue::Str(key)) => map.contains_key(key),
        _ => false,
    }
}

fn size_of(value: &CheckValue) -> Option<usize> {
    match value {
        CheckValue::Json(Value::Array(items)) => Some(items.len()),
        CheckValue::Json(Value::Object(map)) => Some(map.len()),
        CheckValue::Str(text) => Some(text.chars().count()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn users_response() -> ApiResponse {
        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), "cloudflare".to_string());
        let mut cookies = BTreeMap::new();
        cookies.insert("JSESSIONID".to_string(), "ABCDEF123456".to_string());
        ApiResponse {
            status: 200,
            reason: "OK".into(),
            headers,
            cookies,
            body: json!({
                "page": 2,
                "data": [
                    {"id": 7, "email": "michael.lawson@reqres.in", "first_name": "Michael", "last_name": "Lawson"},
                    {"id": 8, "email": "lindsay.ferguson@reqres.in", "first_name": "Lindsay", "last_name": "Ferguson"}
                ]
            })
            .to_string(),
            ..ApiResponse::default()
        }
    }

    fn run(assertions: &[Assertion]) -> (Vec<AssertionResult>, SoftAssertions) {
        let response = users_response();
        let mut soft = SoftAssertions::new();
        let results = assertions
            .iter()
            .map(|assertion| assertion.evaluate(&response, &mut soft))
            .collect();
        (results, soft)
    }

    #[test]
    fn deserializes_flattened_target() {
        let assertion: Assertion = serde_json::from_value(json!({
            "target": "json_path", "path": "data[0].id", "operator": "equals", "value": 7
        }))
        .unwrap();
        assert_eq!(assertion, Assertion::json_path("data[0].id", AssertionOperator::Equals, 7));

        let assertion: Assertion = serde_json::from_value(json!({
            "target": "header", "name": "Server", "operator": "equals", "value": "cloudflare",
            "description": "served by cloudflare"
        }))
        .unwrap();
        assert_eq!(assertion.label(), "served by cloudflare");
    }

    #[test]
    fn passing_assertions_record_nothing() {
        let (results, mut soft) = run(&[
            Assertion::status(200),
            Assertion::json_path("page", AssertionOperator::Equals, 2),
            Assertion::json_path("data", AssertionOperator::HasSize, 2),
            Assertion::json_path("data[0].first_name", AssertionOperator::Equals, "Michael"),
            Assertion::json_path("data.id", AssertionOperator::Contains, 8),
            Assertion::json_path("data.id", AssertionOperator::ContainsInOrder, json!([7, 8])),
            Assertion::json_path("data.last_name", AssertionOperator::HasItems, json!(["Ferguson"])),
            Assertion::json_path("page", AssertionOperator::GreaterThan, 1),
            Assertion::json_path("page", AssertionOperator::LessThan, 3.5),
            Assertion::json_path("support", AssertionOperator::Exists, false),
            Assertion::new(
                AssertionTarget::Header { name: "Server".into() },
                AssertionOperator::Equals,
                "cloudflare",
            ),
            Assertion::new(
                AssertionTarget::Cookie { name: "JSESSIONID".into() },
                AssertionOperator::Exists,
                true,
            ),
            Assertion::new(AssertionTarget::Body, AssertionOperator::Contains, "michael.lawson"),
        ]);

        assert!(results.iter().all(|result| result.passed), "{results:#?}");
        assert!(soft.assert_all().is_ok());
    }

    #[test]
    fn failures_are_recorded_in_order() {
        let (results, mut soft) = run(&[
            Assertion::status(201),
            Assertion::json_path("data[0].id", AssertionOperator::Equals, 4),
            Assertion::json_path("data", AssertionOperator::HasSize, 6),
            Assertion::json_path("cookies.cookie1", AssertionOperator::Equals, "value1"),
        ]);

        assert!(results.iter().all(|result| !result.passed));
        assert_eq!(results[0].actual.as_deref(), Some("200"));
        let err = soft.assert_all().unwrap_err();
        assert_eq!(
            err.to_string(),
            [
                "status equals: expected 201 but got 200",
                "json_path data[0].id equals: expected 4 but got 7",
                "json_path data has_size: expected 6 but got 2",
                "json_path cookies.cookie1 equals: expected value1 (string) but got null (null)",
            ]
            .join("\n")
        );
    }

    #[test]
    fn has_items_reports_missing() {
        let (_, soft) = run(&[Assertion::json_path(
            "data.first_name",
            AssertionOperator::HasItems,
            json!(["Michael", "Tobias"]),
        )]);
        assert_eq!(
            soft.failures()[0].message,
            r#"json_path data.first_name has_items: expected items ["Michael","Tobias"] but missing ["Tobias"]"#
        );
    }

    #[test]
    fn contains_in_order_rejects_reordering() {
        let (_, soft) = run(&[Assertion::json_path(
            "data.id",
            AssertionOperator::ContainsInOrder,
            json!([8, 7]),
        )]);
        assert_eq!(soft.failure_count(), 1);
    }

    #[test]
    fn unreadable_body_is_a_recorded_failure() {
        let response = ApiResponse {
            status: 200,
            body: "<html>".into(),
            ..ApiResponse::default()
        };
        let mut soft = SoftAssertions::new();
        let result = Assertion::json_path("page", AssertionOperator::Equals, 2)
            .evaluate(&response, &mut soft);

        assert!(!result.passed);
        assert!(result.message.starts_with("json_path page equals: could not read json_path page"));
    }
}
