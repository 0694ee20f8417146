//! Shared fixtures for proxy integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use tower::ServiceExt;

use go_cooldown::config::ProxyConfig;
use go_cooldown::cooldown::error::UpstreamError;
use go_cooldown::cooldown::types::VersionInfo;
use go_cooldown::cooldown::upstream::{ForwardedResponse, Upstream};
use go_cooldown::proxy::server::ProxyServer;

pub const UPSTREAM_URL: &str = "https://proxy.example.com";
pub const MODULE: &str = "example.com/module";

/// In-memory upstream serving modules registered with [`FakeUpstream::with_module`]
pub struct FakeUpstream {
    modules: HashMap<String, Vec<VersionInfo>>,
    info_fetches: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            info_fetches: AtomicUsize::new(0),
        }
    }

    /// Registers `module` with `(version, age in days)` pairs in list order.
    /// The last version is reported as `@latest`.
    pub fn with_module(mut self, module: &str, versions: &[(&str, i64)]) -> Self {
        let now = Utc::now();
        self.modules.insert(
            module.to_string(),
            versions
                .iter()
                .map(|(version, days)| VersionInfo::new(*version, now - TimeDelta::days(*days)))
                .collect(),
        );
        self
    }

    pub fn info_fetches(&self) -> usize {
        self.info_fetches.load(Ordering::SeqCst)
    }

    fn versions(&self, module: &str) -> Result<&Vec<VersionInfo>, UpstreamError> {
        self.modules.get(module).ok_or_else(|| not_found(module))
    }
}

fn not_found(what: &str) -> UpstreamError {
    UpstreamError::Status {
        status: StatusCode::NOT_FOUND,
        body: Bytes::from(format!("not found: {what}")),
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch_info(&self, module: &str, version: &str) -> Result<VersionInfo, UpstreamError> {
        self.info_fetches.fetch_add(1, Ordering::SeqCst);
        self.versions(module)?
            .iter()
            .find(|info| info.version == version)
            .cloned()
            .ok_or_else(|| not_found(&format!("{module}@{version}")))
    }

    async fn fetch_list(&self, module: &str) -> Result<Vec<String>, UpstreamError> {
        Ok(self
            .versions(module)?
            .iter()
            .map(|info| info.version.clone())
            .collect())
    }

    async fn fetch_latest(&self, module: &str) -> Result<VersionInfo, UpstreamError> {
        self.versions(module)?
            .last()
            .cloned()
            .ok_or_else(|| not_found(module))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{UPSTREAM_URL}{path}")
    }

    async fn forward(&self, path: &str) -> Result<ForwardedResponse, UpstreamError> {
        Ok(ForwardedResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(format!("forwarded {path}")),
        })
    }
}

/// Builds the full proxy router (tracing layer included) over `upstream`
pub fn create_test_app(upstream: Arc<FakeUpstream>, default_cooldown: TimeDelta) -> Router {
    let config = ProxyConfig::new(UPSTREAM_URL, default_cooldown);
    ProxyServer::with_upstream(config, upstream)
        .unwrap()
        .router()
}

pub async fn send_get(app: Router, path: &str) -> Response {
    app.oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn parse_version_info(body: &str) -> (String, DateTime<Utc>) {
    let info: VersionInfo = serde_json::from_str(body).unwrap();
    (info.version, info.time)
}
