//! # Environment & Variables
//!
//! Resolves the variables a suite run sees and interpolates `{{variable}}`
//! placeholders in request fields.
//!
//! Precedence, lowest first: suite variables, the `.properties` file, the
//! active named environment, then process environment variables prefixed
//! with `RESTCHECK_` (prefix stripped, name lower-cased).

pub mod properties;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use properties::Properties;

pub const ENV_PREFIX: &str = "RESTCHECK_";

/// A single variable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// An environment is a named set of variables (e.g. dev, staging, prod).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// Manages all variable sources and resolves them into one map.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentManager {
    pub properties: Properties,
    pub environments: Vec<Environment>,
    pub active_environment: Option<String>,
    pub process_overrides: HashMap<String, String>,
}

impl EnvironmentManager {
    /// Capture `RESTCHECK_*` variables from the process environment.
    pub fn with_process_env(mut self) -> Self {
        self.process_overrides = overrides_from(std::env::vars());
        self
    }

    /// Make `name` the active environment. Unknown names are an error.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.environments.iter().any(|env| env.name == name) {
            return Err(Error::MissingKey(format!("environment `{name}`")));
        }
        self.active_environment = Some(name.to_string());
        Ok(())
    }

    pub fn resolve(&self, suite_vars: &HashMap<String, String>) -> HashMap<String, String> {
        let mut resolved: HashMap<String, String> = suite_vars.clone();

        for (key, value) in self.properties.iter() {
            resolved.insert(key.to_string(), value.to_string());
        }

        if let Some(active_name) = &self.active_environment {
            if let Some(env) = self.environments.iter().find(|e| &e.name == active_name) {
                for var in &env.variables {
                    if var.enabled && !var.key.is_empty() {
                        resolved.insert(var.key.clone(), var.value.clone());
                    }
                }
            }
        }

        for (key, value) in &self.process_overrides {
            resolved.insert(key.clone(), value.clone());
        }

        resolved
    }
}

fn overrides_from(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter_map(|(key, value)| {
        let name = key.strip_prefix(ENV_PREFIX)?;
        (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value))
    })
    .collect()
}

/// Interpolate `{{variable}}` placeholders in the given text in one
/// left-to-right pass. Unknown placeholders are left untouched and
/// substituted values are never expanded again.
pub fn interpolate(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        match variables.get(&after[..end]) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(key: &str, value: &str) -> Variable {
        Variable {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    fn manager() -> EnvironmentManager {
        let mut properties = Properties::default();
        properties.insert("server", "https://reqres.in/api/users");
        properties.insert("token", "from-properties");
        EnvironmentManager {
            properties,
            environments: vec![Environment {
                name: "staging".into(),
                variables: vec![
                    var("server", "https://staging.example.com"),
                    Variable {
                        enabled: false,
                        ..var("token", "disabled")
                    },
                ],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn properties_override_suite_vars() {
        let mut suite = HashMap::new();
        suite.insert("server".to_string(), "http://localhost".to_string());
        suite.insert("page".to_string(), "2".to_string());

        let resolved = manager().resolve(&suite);
        assert_eq!(resolved["server"], "https://reqres.in/api/users");
        assert_eq!(resolved["page"], "2");
    }

    #[test]
    fn active_environment_overrides_properties() {
        let mut mgr = manager();
        mgr.select("staging").unwrap();

        let resolved = mgr.resolve(&HashMap::new());
        assert_eq!(resolved["server"], "https://staging.example.com");
        assert_eq!(resolved["token"], "from-properties");
    }

    #[test]
    fn process_overrides_win() {
        let mut mgr = manager();
        mgr.process_overrides = overrides_from(
            vec![
                ("RESTCHECK_SERVER".to_string(), "http://override".to_string()),
                ("RESTCHECK_".to_string(), "ignored".to_string()),
                ("PATH".to_string(), "/bin".to_string()),
            ]
            .into_iter(),
        );
        mgr.select("staging").unwrap();

        let resolved = mgr.resolve(&HashMap::new());
        assert_eq!(resolved["server"], "http://override");
        assert!(!resolved.contains_key("path"));
        assert!(!resolved.contains_key(""));
    }

    #[test]
    fn select_unknown_environment_fails() {
        assert!(manager().select("prod").is_err());
    }

    #[test]
    fn interpolate_replaces_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("host".into(), "api.example.com".into());
        vars.insert("port".into(), "8080".into());

        let result = interpolate("https://{{host}}:{{port}}/api", &vars);
        assert_eq!(result, "https://api.example.com:8080/api");
    }

    #[test]
    fn interpolate_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("a".into(), "{{b}}".into());
        vars.insert("b".into(), "x".into());

        assert_eq!(interpolate("{{a}}-{{b}}", &vars), "{{b}}-x");
    }

    #[test]
    fn interpolate_keeps_unclosed_braces() {
        let mut vars = HashMap::new();
        vars.insert("host".into(), "h".into());
        assert_eq!(interpolate("{{host}}/{{open", &vars), "h/{{open");
        assert_eq!(interpolate("{{}}", &vars), "{{}}");
    }

    #[test]
    fn interpolate_leaves_unknown_placeholders() {
        let result = interpolate("{{unknown}}/{id}", &HashMap::new());
        assert_eq!(result, "{{unknown}}/{id}");
    }
}
