use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderName, HeaderValue};
use serde_json::Value;

use crate::auth::{ApiKeyLocation, AuthMethod};
use crate::error::{Error, Result};

use super::method::HttpMethod;

/// Everything needed to issue one request. Built fluently:
///
/// ```
/// use restcheck::http::RequestSpec;
///
/// let spec = RequestSpec::get("https://reqres.in/api/users")
///     .query_param("page", "2")
///     .header("Accept", "application/json");
/// assert_eq!(spec.resolve_url().unwrap().as_str(), "https://reqres.in/api/users?page=2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub path_params: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub body: Option<String>,
    pub auth: AuthMethod,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Value for a `{name}` placeholder in the URL.
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Adds a form field; the body is sent as `application/x-www-form-urlencoded`.
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and the matching content type.
    pub fn json_body(self, body: &Value) -> Self {
        self.header(CONTENT_TYPE.as_str(), "application/json")
            .body(body.to_string())
    }

    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Final URL: path params substituted, query params appended.
    pub fn resolve_url(&self) -> Result<reqwest::Url> {
        let mut raw = self.url.trim().to_string();
        for (name, value) in &self.path_params {
            raw = raw.replace(&format!("{{{name}}}"), value);
        }
        if let Some(name) = unresolved_placeholder(&raw) {
            return Err(Error::InvalidRequest(format!(
                "No value for path parameter `{name}` in `{raw}`"
            )));
        }

        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| Error::InvalidRequest(format!("Invalid URL `{raw}`: {e}")))?;

        let api_key_in_query = match &self.auth {
            AuthMethod::ApiKey {
                key,
                value,
                location: ApiKeyLocation::Query,
            } => Some((key.trim(), value.trim())),
            _ => None,
        };
        if !self.query.is_empty() || api_key_in_query.is_some() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                query_pairs.append_pair(key, value);
            }
            if let Some((key, value)) = api_key_in_query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Turn the spec into a `reqwest` request. Digest credentials are not
    /// applied here because they depend on the server's challenge.
    pub fn build(&self, client: &reqwest::Client) -> Result<reqwest::RequestBuilder> {
        self.auth.validate()?;
        if !self.form.is_empty() && self.body.is_some() {
            return Err(Error::InvalidRequest(
                "A request cannot carry both form params and a raw body".to_string(),
            ));
        }

        let url = self.resolve_url()?;
        let mut req_builder = client.request(self.method.into(), url);

        for (key, value) in &self.headers {
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::InvalidRequest("Header key is empty".to_string()));
            }
            let header_name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("Invalid header key `{key}`: {e}")))?;
            let header_value = HeaderValue::from_str(value.trim()).map_err(|e| {
                Error::InvalidRequest(format!("Invalid header value `{value}`: {e}"))
            })?;
            req_builder = req_builder.header(header_name, header_value);
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let header_value = HeaderValue::from_str(&cookie)
                .map_err(|e| Error::InvalidRequest(format!("Invalid cookie `{cookie}`: {e}")))?;
            req_builder = req_builder.header(COOKIE, header_value);
        }

        match &self.auth {
            AuthMethod::None | AuthMethod::Digest { .. } => {}
            AuthMethod::ApiKey {
                location: ApiKeyLocation::Query,
                ..
            } => {}
            AuthMethod::Bearer { token } => {
                req_builder = req_builder.bearer_auth(token.trim());
            }
            AuthMethod::Basic { username, password } => {
                req_builder = req_builder.basic_auth(username.trim(), Some(password.trim()));
            }
            AuthMethod::ApiKey {
                key,
                value,
                location: ApiKeyLocation::Header,
            } => {
                let key = key.trim();
                let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    Error::InvalidRequest(format!("Invalid API key header `{key}`: {e}"))
                })?;
                let header_value = HeaderValue::from_str(value.trim()).map_err(|e| {
                    Error::InvalidRequest(format!("Invalid API key header value: {e}"))
                })?;
                req_builder = req_builder.header(header_name, header_value);
            }
        }

        if !self.form.is_empty() {
            req_builder = req_builder.form(&self.form);
        } else if let Some(body) = &self.body {
            if !self.method.is_bodyless() && !body.trim().is_empty() {
                req_builder = req_builder.body(body.clone());
            }
        }

        if let Some(timeout) = self.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        Ok(req_builder)
    }
}

/// First `{name}` left in a URL, ignoring `{{...}}` variable placeholders.
fn unresolved_placeholder(url: &str) -> Option<&str> {
    let mut rest = url;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        if let Some(stripped) = after.strip_prefix('{') {
            rest = stripped.find("}}").map_or("", |end| &stripped[end + 2..]);
            continue;
        }
        let end = after.find('}')?;
        let name = &after[..end];
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Some(name);
        }
        rest = &after[end + 1..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_path_params() {
        let spec = RequestSpec::get("http://ergast.com/api/f1/{raceSeason}/circuits.json")
            .path_param("raceSeason", 2016);
        assert_eq!(
            spec.resolve_url().unwrap().as_str(),
            "http://ergast.com/api/f1/2016/circuits.json"
        );
    }

    #[test]
    fn missing_path_param_is_an_error() {
        let err = RequestSpec::get("http://ergast.com/api/f1/{raceSeason}/circuits.json")
            .resolve_url()
            .unwrap_err();
        assert!(err.to_string().contains("raceSeason"));
    }

    #[test]
    fn appends_encoded_query_params() {
        let spec = RequestSpec::get("https://reqres.in/api/users?page=2")
            .query_param("per_page", 3)
            .query_param("name", "John Doe");
        assert_eq!(
            spec.resolve_url().unwrap().as_str(),
            "https://reqres.in/api/users?page=2&per_page=3&name=John+Doe"
        );
    }

    #[test]
    fn api_key_in_query() {
        let spec = RequestSpec::get("https://example.com/items").auth(AuthMethod::ApiKey {
            key: "api_key".into(),
            value: "secret".into(),
            location: ApiKeyLocation::Query,
        });
        assert_eq!(
            spec.resolve_url().unwrap().as_str(),
            "https://example.com/items?api_key=secret"
        );
    }

    #[test]
    fn invalid_url_is_an_error() {
        assert!(RequestSpec::get("not a url").resolve_url().is_err());
    }

    #[test]
    fn build_rejects_form_with_body() {
        let client = reqwest::Client::new();
        let spec = RequestSpec::post("https://reqres.in/users")
            .form_param("name", "John Doe")
            .body("{}");
        assert!(spec.build(&client).is_err());
    }

    #[test]
    fn build_sets_headers_cookies_and_auth() {
        let client = reqwest::Client::new();
        let request = RequestSpec::get("https://reqres.in/api/users")
            .header("Content-Type", "application/json")
            .cookie("test1", "testing1")
            .cookie("test2", "testing2")
            .auth(AuthMethod::bearer("token"))
            .build(&client)
            .unwrap()
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["cookie"], "test1=testing1; test2=testing2");
        assert_eq!(headers["authorization"], "Bearer token");
    }

    #[test]
    fn json_body_sets_content_type() {
        let client = reqwest::Client::new();
        let request = RequestSpec::post("https://reqres.in/api/users")
            .json_body(&json!({"name": "morpheus"}))
            .build(&client)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(br#"{"name":"morpheus"}"#.as_slice())
        );
    }

    #[test]
    fn bad_header_name_is_an_error() {
        let client = reqwest::Client::new();
        let spec = RequestSpec::get("https://reqres.in").header("bad header", "x");
        assert!(spec.build(&client).is_err());
    }

    #[test]
    fn placeholder_scan_skips_variables() {
        assert_eq!(unresolved_placeholder("{{server}}/users"), None);
        assert_eq!(unresolved_placeholder("{{server}}/{id}"), Some("id"));
        assert_eq!(unresolved_placeholder("https://x/?q={\"a\":1}"), None);
    }
}
