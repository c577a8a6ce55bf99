use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, SET_COOKIE, WWW_AUTHENTICATE};
use tracing::{debug, info, warn};

use crate::auth::AuthMethod;
use crate::error::{Error, Result};

use super::digest::{DigestChallenge, new_cnonce};
use super::request::RequestSpec;
use super::response::{ApiResponse, parse_set_cookie};

const MAX_REDIRECTS: usize = 10;

/// Sends [`RequestSpec`]s and captures their responses.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn send(&self, spec: &RequestSpec) -> Result<ApiResponse> {
        debug!(method = %spec.method, url = %spec.url, "sending request");
        let started = Instant::now();

        let mut response = spec.build(&self.client)?.send().await?;

        if let AuthMethod::Digest { username, password } = &spec.auth {
            if response.status() == StatusCode::UNAUTHORIZED {
                let challenge = response
                    .headers()
                    .get_all(WWW_AUTHENTICATE)
                    .iter()
                    .filter_map(|value| value.to_str().ok())
                    .find_map(DigestChallenge::parse);

                match challenge {
                    Some(challenge) => {
                        let url = spec.resolve_url()?;
                        let uri = match url.query() {
                            Some(query) => format!("{}?{query}", url.path()),
                            None => url.path().to_string(),
                        };
                        let authorization = challenge.authorization(
                            username.trim(),
                            password.trim(),
                            &spec.method.to_string(),
                            &uri,
                            &new_cnonce(),
                        )?;
                        debug!(realm = %challenge.realm, "answering digest challenge");
                        response = spec
                            .build(&self.client)?
                            .header(AUTHORIZATION, authorization)
                            .send()
                            .await?;
                    }
                    None => warn!(url = %spec.url, "401 without a digest challenge"),
                }
            }
        }

        let captured = capture(response, started).await?;
        info!(
            method = %spec.method,
            url = %spec.url,
            status = captured.status,
            duration_ms = captured.duration_ms,
            "request finished"
        );
        Ok(captured)
    }
}

async fn capture(response: reqwest::Response, started: Instant) -> Result<ApiResponse> {
    let status = response.status();
    let headers = collect_headers(response.headers());
    let cookies = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect();

    let bytes = response.bytes().await.map_err(Error::Http)?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(ApiResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        headers,
        cookies,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        duration_ms,
        size_bytes: bytes.len(),
    })
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<binary>");
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
