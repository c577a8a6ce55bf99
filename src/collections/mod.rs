//! # Suites
//!
//! A suite is a JSON collection of named cases. Each case holds one request
//! template, the expectations checked against its response, optional groups
//! (e.g. `SmokeSuite`, `RegressionSuite`) and optional data rows; a case with
//! data rows runs once per row.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthMethod;
use crate::environment::{Environment, interpolate};
use crate::http::{HttpMethod, RequestSpec};
use crate::test_data::render;
use crate::testing::Assertion;

/// Root collection containing all cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub groups: Vec<String>,
    pub request: RequestTemplate,
    #[serde(default)]
    pub expect: Vec<Assertion>,
    #[serde(default)]
    pub data: Vec<BTreeMap<String, Value>>,
}

/// A request whose string fields may contain `{{variable}}` placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestTemplate {
    #[serde(default)]
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub path_params: BTreeMap<String, Value>,
    #[serde(default)]
    pub query: BTreeMap<String, Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub form: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub auth: AuthMethod,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl TestCase {
    /// A case with no groups only runs when no group filter is given.
    pub fn matches_groups(&self, groups: &[String]) -> bool {
        groups.is_empty() || self.groups.iter().any(|group| groups.contains(group))
    }

    /// One variable layer per run: the data rows, or a single empty layer.
    pub fn iterations(&self) -> Vec<HashMap<String, String>> {
        if self.data.is_empty() {
            return vec![HashMap::new()];
        }
        self.data
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(key, value)| (key.clone(), render(value)))
                    .collect()
            })
            .collect()
    }
}

impl RequestTemplate {
    pub fn to_spec(&self, variables: &HashMap<String, String>) -> RequestSpec {
        let fill = |text: &str| interpolate(text, variables);
        let fill_value = |value: &Value| fill(&render(value));

        let mut spec = RequestSpec::new(self.method, fill(&self.url));
        spec.path_params = self
            .path_params
            .iter()
            .map(|(k, v)| (k.clone(), fill_value(v)))
            .collect();
        spec.query = self
            .query
            .iter()
            .map(|(k, v)| (k.clone(), fill_value(v)))
            .collect();
        spec.headers = self
            .headers
            .iter()
            .map(|(k, v)| (fill(k), fill(v)))
            .collect();
        spec.cookies = self
            .cookies
            .iter()
            .map(|(k, v)| (k.clone(), fill(v)))
            .collect();
        spec.form = self
            .form
            .iter()
            .map(|(k, v)| (k.clone(), fill(v)))
            .collect();
        spec.auth = self.auth.map_strings(fill);
        spec.timeout = self.timeout_ms.map(Duration::from_millis);

        match &self.body {
            None | Some(Value::Null) => spec,
            Some(Value::String(text)) => spec.body(fill(text)),
            Some(json) => {
                let rendered = fill_json(json, &fill).to_string();
                spec.header("Content-Type", "application/json").body(rendered)
            }
        }
    }
}

/// Fill placeholders inside string nodes and object keys, so substituted
/// values are escaped by the serializer.
fn fill_json(value: &Value, fill: &impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(text) => Value::String(fill(text)),
        Value::Array(items) => Value::Array(items.iter().map(|item| fill_json(item, fill)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (fill(key), fill_json(item, fill)))
                .collect(),
        ),
        other => other.clone(),
    }
}
