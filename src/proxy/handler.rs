//! axum router and request handlers for the cooldown proxy
//!
//! Every GET path lands in [`handle_request`], which classifies it and
//! dispatches to the matching operation.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::config::ProxyConfig;
use crate::cooldown::error::{CooldownError, UpstreamError};
use crate::cooldown::filter::CooldownFilter;
use crate::cooldown::types::cutoff;
use crate::proxy::error::ProxyError;
use crate::proxy::route::{Operation, classify};

/// Shared state handed to every request
pub struct AppState {
    pub config: ProxyConfig,
    pub filter: CooldownFilter,
}

/// Build the axum [`Router`] serving the GOPROXY protocol
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_request))
        .route("/{*path}", get(handle_request))
        .with_state(state)
}

#[instrument(skip_all, fields(path = %uri.path()))]
async fn handle_request(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    info!("request");

    let request = classify(uri.path(), state.config.default_cooldown);
    let cutoff = cutoff(Utc::now(), request.cooldown);

    match request.operation {
        Operation::List { module } => handle_list(&state, &module, cutoff).await,
        Operation::Info { module, version } => handle_info(&state, &module, &version, cutoff).await,
        Operation::Latest { module } => handle_latest(&state, &module, cutoff).await,
        Operation::Download { path } => redirect_to_upstream(&state, &path),
        Operation::PassThrough { path } => proxy_request(&state, &path).await,
    }
}

async fn handle_list(state: &AppState, module: &str, cutoff: DateTime<Utc>) -> Response {
    match state.filter.filtered_list(module, cutoff).await {
        Ok(versions) => {
            let body: String = versions.iter().map(|v| format!("{v}\n")).collect();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response()
        }
        Err(e) => ProxyError::new("failed to fetch version list", e).into_response(),
    }
}

async fn handle_info(
    state: &AppState,
    module: &str,
    version: &str,
    cutoff: DateTime<Utc>,
) -> Response {
    match state.filter.version_info(module, version, cutoff).await {
        Ok(info) => Json(info.as_ref()).into_response(),
        // A missing version answers exactly like a hidden one
        Err(CooldownError::Upstream(UpstreamError::Status { status, .. }))
            if status == StatusCode::NOT_FOUND || status == StatusCode::GONE =>
        {
            debug!(module, version, %status, "version unknown upstream");
            ProxyError::new("failed to fetch version info", CooldownError::Hidden).into_response()
        }
        Err(e) => ProxyError::new("failed to fetch version info", e).into_response(),
    }
}

async fn handle_latest(state: &AppState, module: &str, cutoff: DateTime<Utc>) -> Response {
    match state.filter.latest(module, cutoff).await {
        Ok(info) => Json(info.as_ref()).into_response(),
        Err(e) => ProxyError::new("failed to fetch latest", e).into_response(),
    }
}

/// `.mod` and `.zip` are served by the upstream directly
fn redirect_to_upstream(state: &AppState, path: &str) -> Response {
    let url = state.filter.upstream().url_for(path);
    info!(%url, "redirecting to upstream");
    Redirect::temporary(&url).into_response()
}

async fn proxy_request(state: &AppState, path: &str) -> Response {
    info!(%path, "proxying request");

    match state.filter.upstream().forward(path).await {
        Ok(forwarded) => {
            let mut response = (forwarded.status, forwarded.body).into_response();
            response.headers_mut().extend(forwarded.headers);
            response
        }
        Err(e) => ProxyError::new("failed to proxy request", e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use bytes::Bytes;
    use chrono::TimeDelta;
    use tower::ServiceExt;

    use crate::cooldown::cache::MetadataCache;
    use crate::cooldown::types::VersionInfo;
    use crate::cooldown::upstream::{ForwardedResponse, MockUpstream};

    const UPSTREAM: &str = "https://proxy.example.com";

    fn test_app(mock: MockUpstream) -> Router {
        let state = Arc::new(AppState {
            config: ProxyConfig::new(UPSTREAM, TimeDelta::days(7)),
            filter: CooldownFilter::new(Arc::new(mock), MetadataCache::new(100).unwrap()),
        });
        create_router(state)
    }

    async fn send_get(app: Router, path: &str) -> Response {
        app.oneshot(
            axum::http::Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn aged(version: &str, days: i64) -> VersionInfo {
        VersionInfo::new(version, Utc::now() - TimeDelta::days(days))
    }

    #[tokio::test]
    async fn list_responds_with_newline_terminated_versions() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch_list()
            .returning(|_| Ok(vec!["v1.0.0".to_string(), "v2.0.0".to_string()]));
        mock.expect_fetch_info().returning(|_, version| match version {
            "v1.0.0" => Ok(aged(version, 30)),
            _ => Ok(aged(version, 1)),
        });

        let response = send_get(test_app(mock), "/example.com/module/@v/list").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(response).await, "v1.0.0\n");
    }

    #[tokio::test]
    async fn info_serializes_go_proxy_json() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch_info()
            .returning(|_, version| Ok(aged(version, 30)));

        let response = send_get(test_app(mock), "/example.com/module/@v/v1.0.0.info").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json: serde_json::Value = serde_json::from_str(&body_of(response).await).unwrap();
        assert_eq!(json["Version"], "v1.0.0");
        assert!(json["Time"].is_string());
    }

    #[tokio::test]
    async fn duration_prefix_overrides_default_cooldown() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch_info()
            .returning(|_, version| Ok(aged(version, 3)));
        let app = test_app(mock);

        let hidden = send_get(app.clone(), "/example.com/module/@v/v1.0.0.info").await;
        let visible = send_get(app, "/1d/example.com/module/@v/v1.0.0.info").await;

        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
        assert_eq!(visible.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_with_undecodable_upstream_response_is_bad_gateway() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch_list().returning(|_| {
            Err(UpstreamError::InvalidMetadata(
                serde_json::from_str::<serde_json::Value>("").unwrap_err(),
            ))
        });

        let response = send_get(test_app(mock), "/example.com/module/@v/list").await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn info_gone_upstream_answers_like_hidden_version() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch_info().returning(|_, _| {
            Err(UpstreamError::Status {
                status: StatusCode::GONE,
                body: Bytes::from_static(b"gone: retracted"),
            })
        });

        let response = send_get(test_app(mock), "/example.com/module/@v/v1.0.0.info").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, "version not found\n");
    }

    #[tokio::test]
    async fn list_not_found_upstream_is_passed_through() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch_list().returning(|_| {
            Err(UpstreamError::Status {
                status: StatusCode::NOT_FOUND,
                body: Bytes::from_static(b"not found: example.com/module"),
            })
        });

        let response = send_get(test_app(mock), "/example.com/module/@v/list").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, "not found: example.com/module");
    }

    #[tokio::test]
    async fn download_redirects_to_upstream() {
        let mut mock = MockUpstream::new();
        mock.expect_url_for()
            .returning(|path| format!("{UPSTREAM}{path}"));
        mock.expect_fetch_info().never();
        mock.expect_forward().never();

        let response = send_get(test_app(mock), "/30d/example.com/module/@v/v1.0.0.zip").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://proxy.example.com/example.com/module/@v/v1.0.0.zip"
        );
    }

    #[tokio::test]
    async fn unknown_path_is_forwarded_verbatim() {
        let mut mock = MockUpstream::new();
        mock.expect_forward()
            .withf(|path| path == "/sumdb/sum.golang.org/supported")
            .returning(|_| {
                let mut headers = axum::http::HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
                Ok(ForwardedResponse {
                    status: StatusCode::NOT_FOUND,
                    headers,
                    body: Bytes::from_static(b"not supported"),
                })
            });

        let response = send_get(test_app(mock), "/sumdb/sum.golang.org/supported").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(body_of(response).await, "not supported");
    }
}
