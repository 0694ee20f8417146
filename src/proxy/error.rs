//! Mapping of cooldown and upstream failures onto HTTP responses

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::cooldown::error::{CooldownError, UpstreamError};

/// A failed request together with what the proxy was trying to do
#[derive(Debug)]
pub struct ProxyError {
    action: &'static str,
    source: CooldownError,
}

impl ProxyError {
    pub fn new(action: &'static str, source: impl Into<CooldownError>) -> Self {
        Self {
            action,
            source: source.into(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let Self { action, source } = self;

        match source {
            CooldownError::Hidden => text_response(StatusCode::NOT_FOUND, "version not found"),
            CooldownError::NoEligibleVersion => {
                text_response(StatusCode::NOT_FOUND, "no versions available")
            }
            // Upstream answered; its status and body are the caller's answer too
            CooldownError::Upstream(UpstreamError::Status { status, body }) => {
                error!(%status, "{}: upstream returned non-success", action);
                (status, body).into_response()
            }
            CooldownError::Upstream(e) => {
                error!(error = %e, "{}", action);
                text_response(StatusCode::BAD_GATEWAY, action)
            }
        }
    }
}

/// Plain text error body, newline terminated
pub fn text_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{message}\n"),
    )
        .into_response()
}
