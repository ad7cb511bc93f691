//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router forwarding every path to the upstream
//! - Put the ModSecurity gate in front of the upstream
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a listener until shutdown is signalled

use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigError, GateServerConfig};
use crate::gate::{ModSecurityLayer, VerdictTransport};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::upstream::{forward, Upstream};

/// Standalone server hosting the gate in front of one upstream.
pub struct HttpServer {
    router: Router,
    config: GateServerConfig,
}

impl HttpServer {
    /// Create a server using the default HTTP verdict transport.
    pub fn new(config: GateServerConfig) -> Result<Self, ConfigError> {
        let gate = ModSecurityLayer::new(config.modsecurity.clone())?;
        Self::with_gate(config, gate)
    }

    /// Create a server around an already built gate.
    pub fn with_gate<T: VerdictTransport>(
        config: GateServerConfig,
        gate: ModSecurityLayer<T>,
    ) -> Result<Self, ConfigError> {
        let upstream = Upstream::new(&config.upstream.url)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let router = Self::build_router(&config, upstream, gate);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<T: VerdictTransport>(
        config: &GateServerConfig,
        upstream: Upstream,
        gate: ModSecurityLayer<T>,
    ) -> Router {
        Router::new()
            .route("/{*path}", any(forward))
            .route("/", any(forward))
            .with_state(upstream)
            .layer(gate)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            modsecurity = %self.config.modsecurity.modsecurity_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateServerConfig {
        &self.config
    }
}
