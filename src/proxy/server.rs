//! Proxy server initialization and lifecycle

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{FETCH_TIMEOUT_MS, ProxyConfig};
use crate::cooldown::cache::MetadataCache;
use crate::cooldown::error::CacheError;
use crate::cooldown::filter::CooldownFilter;
use crate::cooldown::go_proxy::GoProxyUpstream;
use crate::cooldown::upstream::Upstream;
use crate::proxy::handler::{AppState, create_router};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to create cache: {0}")]
    Cache(#[from] CacheError),
}

pub struct ProxyServer {
    state: Arc<AppState>,
}

impl ProxyServer {
    /// Creates a server mirroring the Go proxy at `config.upstream`
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let upstream = GoProxyUpstream::new(
            &config.upstream,
            Duration::from_millis(FETCH_TIMEOUT_MS),
        )?;
        Self::with_upstream(config, Arc::new(upstream))
    }

    /// Creates a server backed by a custom upstream implementation
    pub fn with_upstream(
        config: ProxyConfig,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, ServerError> {
        let cache = MetadataCache::new(config.cache_size)?;
        let filter = CooldownFilter::new(upstream, cache);

        Ok(Self {
            state: Arc::new(AppState { config, filter }),
        })
    }

    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state)).layer(TraceLayer::new_for_http())
    }

    /// Serves on `0.0.0.0:{port}` until SIGINT or SIGTERM
    pub async fn run(self) -> std::io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(%addr, "listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
