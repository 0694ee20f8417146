//! Go module proxy client (GOPROXY protocol)

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName};
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, USER_AGENT};
use crate::cooldown::error::UpstreamError;
use crate::cooldown::types::VersionInfo;
use crate::cooldown::upstream::{ForwardedResponse, Upstream};

/// Headers that describe the upstream connection rather than the payload
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Upstream implementation backed by a Go module proxy such as proxy.golang.org
#[derive(Clone)]
pub struct GoProxyUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl GoProxyUpstream {
    /// Creates a client for `base_url`, bounding every request by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client for `base_url` with the default fetch timeout
    pub fn with_base_url(base_url: &str) -> Result<Self, reqwest::Error> {
        Self::new(base_url, Duration::from_millis(FETCH_TIMEOUT_MS))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `url` and returns the body of a 200 response
    async fn get_ok(&self, url: &str) -> Result<bytes::Bytes, UpstreamError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            warn!("Go proxy returned status {}: {}", status, url);
            let body = response.bytes().await?;
            return Err(UpstreamError::Status { status, body });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait::async_trait]
impl Upstream for GoProxyUpstream {
    async fn fetch_info(&self, module: &str, version: &str) -> Result<VersionInfo, UpstreamError> {
        let url = format!("{}/{}/@v/{}.info", self.base_url, module, version);
        let body = self.get_ok(&url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_list(&self, module: &str) -> Result<Vec<String>, UpstreamError> {
        let url = format!("{}/{}/@v/list", self.base_url, module);
        let body = self.get_ok(&url).await?;

        // Go proxy returns versions one per line
        let versions = String::from_utf8_lossy(&body)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(versions)
    }

    async fn fetch_latest(&self, module: &str) -> Result<VersionInfo, UpstreamError> {
        let url = format!("{}/{}/@latest", self.base_url, module);
        let body = self.get_ok(&url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn forward(&self, path: &str) -> Result<ForwardedResponse, UpstreamError> {
        let url = self.url_for(path);
        debug!("Forwarding {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        let mut headers = HeaderMap::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            if !is_hop_by_hop(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        let body = response.bytes().await?;

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }
}
