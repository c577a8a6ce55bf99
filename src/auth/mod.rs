//! # Authentication
//!
//! Authentication methods a request can carry: Bearer Token, Basic Auth,
//! Digest Auth and API Key (header or query). Digest auth needs a server
//! challenge first, so the client handles it in two round trips (see
//! [`crate::http::digest`]).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported authentication methods.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    None,
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    Digest {
        username: String,
        password: String,
    },
    ApiKey {
        key: String,
        value: String,
        #[serde(default)]
        location: ApiKeyLocation,
    },
}

/// Where to place the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

impl AuthMethod {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn digest(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthMethod::Digest {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        AuthMethod::Bearer {
            token: token.into(),
        }
    }

    /// Reject credentials that cannot produce a meaningful request.
    pub fn validate(&self) -> Result<()> {
        match self {
            AuthMethod::None => Ok(()),
            AuthMethod::Bearer { token } if token.trim().is_empty() => Err(Error::InvalidRequest(
                "Bearer token cannot be empty".to_string(),
            )),
            AuthMethod::Basic { username, .. } | AuthMethod::Digest { username, .. }
                if username.trim().is_empty() =>
            {
                Err(Error::InvalidRequest(
                    "Auth username cannot be empty".to_string(),
                ))
            }
            AuthMethod::ApiKey { key, .. } if key.trim().is_empty() => Err(Error::InvalidRequest(
                "API key name cannot be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Replace `{{var}}` placeholders in every credential field.
    pub fn map_strings(&self, f: impl Fn(&str) -> String) -> Self {
        match self {
            AuthMethod::None => AuthMethod::None,
            AuthMethod::Bearer { token } => AuthMethod::Bearer { token: f(token) },
            AuthMethod::Basic { username, password } => AuthMethod::Basic {
                username: f(username),
                password: f(password),
            },
            AuthMethod::Digest { username, password } => AuthMethod::Digest {
                username: f(username),
                password: f(password),
            },
            AuthMethod::ApiKey {
                key,
                value,
                location,
            } => AuthMethod::ApiKey {
                key: f(key),
                value: f(value),
                location: *location,
            },
        }
    }
}
