//! Shared HTTP plumbing: a hardened client and a size-capped JSON GET.

use std::time::Duration;

use reqwest::{Client, Url, tls};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::TempestError;

/// Upper bound on any response body we are willing to buffer.
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    max_body: usize,
}

impl HttpClient {
    pub fn new() -> Result<Self, TempestError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .min_tls_version(tls::Version::TLS_1_2)
            .user_agent(concat!("tempest-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TempestError::ClientBuild)?;

        Ok(Self {
            http,
            max_body: MAX_RESPONSE_BYTES,
        })
    }

    /// Same client with a different body cap.
    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// GETs `path` relative to `base` and decodes the JSON body as `T`.
    ///
    /// An absolute `path` replaces whatever path `base` carries. `target`
    /// names the service in error messages.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        target: &str,
        base: &Url,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<T, TempestError> {
        let url = base.join(path).map_err(|e| TempestError::InvalidServerUrl {
            url: format!("{base}{path}"),
            reason: e.to_string(),
        })?;

        debug!(%url, "GET");

        let mut request = self.http.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let mut response = request.send().await.map_err(|source| TempestError::Transport {
            target: target.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TempestError::UpstreamStatus {
                target: target.to_string(),
                status,
                path: path.to_string(),
            });
        }

        let too_large = || TempestError::ResponseTooLarge {
            path: path.to_string(),
            limit: self.max_body,
        };

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| TempestError::Transport {
            target: target.to_string(),
            source,
        })? {
            if body.len() + chunk.len() > self.max_body {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body).map_err(|source| TempestError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// Checks that `raw` is an absolute http(s) URL with a host.
pub fn validate_server_url(raw: &str) -> Result<Url, TempestError> {
    let invalid = |reason: String| TempestError::InvalidServerUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https".into()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}
