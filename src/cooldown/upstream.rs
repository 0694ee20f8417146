//! Upstream trait for fetching module metadata from a Go module proxy

#[cfg(test)]
use mockall::automock;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::cooldown::error::UpstreamError;
use crate::cooldown::types::VersionInfo;

/// A raw upstream response, forwarded to the client without inspection
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Trait for reading module metadata from the proxy being mirrored
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches `/{module}/@v/{version}.info`
    async fn fetch_info(&self, module: &str, version: &str) -> Result<VersionInfo, UpstreamError>;

    /// Fetches `/{module}/@v/list`
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Version identifiers in upstream order, empty lines dropped
    /// * `Err(UpstreamError)` - If the request fails or upstream answers with a non-success status
    async fn fetch_list(&self, module: &str) -> Result<Vec<String>, UpstreamError>;

    /// Fetches `/{module}/@latest`
    async fn fetch_latest(&self, module: &str) -> Result<VersionInfo, UpstreamError>;

    /// Returns the absolute upstream URL for a request path such as `/m/@v/v1.0.0.zip`
    fn url_for(&self, path: &str) -> String;

    /// Performs a plain GET of `path` upstream and returns the response as is
    async fn forward(&self, path: &str) -> Result<ForwardedResponse, UpstreamError>;
}
