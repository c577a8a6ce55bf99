use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::json_path;

/// A captured response. Header names are lower-case; repeated headers are
/// joined with `, `.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub reason: String,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub body: String,
    pub duration_ms: u64,
    pub size_bytes: usize,
}

impl ApiResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Value at `path` in the JSON body.
    pub fn json_path(&self, path: &str) -> Result<Option<Value>> {
        json_path::lookup(&self.json()?, path)
    }

    /// List at `path`; a scalar result is an error, a missing one is empty.
    pub fn json_list(&self, path: &str) -> Result<Vec<Value>> {
        match self.json_path(path)? {
            Some(Value::Array(items)) => Ok(items),
            None => Ok(Vec::new()),
            Some(other) => Err(Error::JsonPath {
                path: path.to_string(),
                reason: format!("expected a list but found {other}"),
            }),
        }
    }

    pub fn status_line(&self) -> String {
        format!("{} {}", self.status, self.reason)
    }
}

/// Name and value of a `Set-Cookie` header; attributes are ignored.
pub(crate) fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().trim_matches('"').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> ApiResponse {
        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), "cloudflare".to_string());
        ApiResponse {
            status: 200,
            reason: "OK".into(),
            headers,
            body: body.to_string(),
            ..ApiResponse::default()
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(json!({}));
        assert_eq!(resp.header("Server"), Some("cloudflare"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn json_list_projects_fields() {
        let resp = response(json!([{"email": "Eliseo@gardner.biz"}, {"email": "Jayne_Kuhic@sydney.com"}]));
        assert_eq!(
            resp.json_list("email").unwrap(),
            vec![json!("Eliseo@gardner.biz"), json!("Jayne_Kuhic@sydney.com")]
        );
        assert_eq!(resp.json_list("").unwrap().len(), 2);
        assert!(resp.json_list("missing").unwrap().is_empty());
    }

    #[test]
    fn json_list_rejects_scalars() {
        let resp = response(json!({"page": 2}));
        assert!(resp.json_list("page").is_err());
    }

    #[test]
    fn non_json_body_is_an_error() {
        let resp = ApiResponse {
            body: "<html>".into(),
            ..ApiResponse::default()
        };
        assert!(resp.json().is_err());
    }

    #[test]
    fn parses_set_cookie() {
        assert_eq!(
            parse_set_cookie("JSESSIONID=ABCDEF123456; Path=/; HttpOnly"),
            Some(("JSESSIONID".into(), "ABCDEF123456".into()))
        );
        assert_eq!(parse_set_cookie("=nothing"), None);
        assert_eq!(parse_set_cookie("garbage"), None);
    }
}
