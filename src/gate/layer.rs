//! The gate as a tower `Layer` / `Service`.
//!
//! # Per-request flow
//! ```text
//! Upgrade: websocket ───────────────────────────────────────▶ upstream
//! otherwise:
//!   capture body ──overflow/read error──────────────┐
//!        │                                          ▼
//!   mirror + send verdict ──transport failure──▶ error policy ─▶ 413/502 | upstream
//!        │
//!   arbitrate status ──Allow──▶ upstream
//!        └──────────────Block──▶ relay verdict response
//! ```
//!
//! The service holds no per-request state; clones share the config,
//! transport and header filter.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
};
use futures_util::{future::BoxFuture, FutureExt};
use tower::{Layer, Service};

use crate::config::{ConfigError, ModSecurityConfig};
use crate::gate::{
    arbiter::{arbitrate, Verdict},
    capture::{capture, CaptureError},
    error::GateError,
    policy::{self, Resolution},
    relay::relay,
    request_id,
    upgrade::is_websocket,
    verdict::{default_header_filter, HeaderFilter, HttpTransport, VerdictRequest, VerdictTransport},
};
use crate::observability::metrics;

const DEFAULT_NAME: &str = "modsecurity";

/// Layer that puts a ModSecurity gate in front of a service.
#[derive(Clone)]
pub struct ModSecurityLayer<T = HttpTransport> {
    gate: Gate<T>,
}

impl ModSecurityLayer<HttpTransport> {
    /// Validate `config` and build a gate with the default HTTP transport.
    pub fn new(config: ModSecurityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(Duration::from_millis(config.verdict_timeout_ms))
            .map_err(ConfigError::Transport)?;
        Ok(Self::build(config, transport))
    }
}

impl<T: VerdictTransport> ModSecurityLayer<T> {
    /// Validate `config` and build a gate sending verdicts through `transport`.
    pub fn with_transport(config: ModSecurityConfig, transport: T) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, transport))
    }

    fn build(config: ModSecurityConfig, transport: T) -> Self {
        Self {
            gate: Gate {
                name: Arc::from(DEFAULT_NAME),
                config: Arc::new(config),
                transport,
                header_filter: Arc::new(default_header_filter),
            },
        }
    }

    /// Name reported in every log event of this gate.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.gate.name = Arc::from(name.into());
        self
    }

    /// Replace the predicate choosing which headers reach the decision service.
    pub fn with_header_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&HeaderName, &HeaderValue) -> bool + Send + Sync + 'static,
    {
        self.gate.header_filter = Arc::new(filter);
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &ModSecurityConfig {
        &self.gate.config
    }
}

impl<S, T: Clone> Layer<S> for ModSecurityLayer<T> {
    type Service = ModSecurity<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        ModSecurity {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Service produced by [`ModSecurityLayer`].
#[derive(Clone)]
pub struct ModSecurity<S, T = HttpTransport> {
    inner: S,
    gate: Gate<T>,
}

impl<S, T> Service<Request<Body>> for ModSecurity<S, T>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    T: VerdictTransport,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let gate = self.gate.clone();

        Box::pin(async move {
            match gate.inspect(request).await {
                Decision::Forward(request) => inner.call(request).await,
                Decision::Respond(response) => Ok(response),
            }
        })
    }
}

#[derive(Clone)]
struct Gate<T> {
    name: Arc<str>,
    config: Arc<ModSecurityConfig>,
    transport: T,
    header_filter: HeaderFilter,
}

enum Decision {
    Forward(Request<Body>),
    Respond(Response<Body>),
}

/// A failed inspection plus the request to use if the policy fails open.
struct Failure {
    error: GateError,
    request: Request<Body>,
}

impl<T: VerdictTransport> Gate<T> {
    async fn inspect(&self, request: Request<Body>) -> Decision {
        if is_websocket(request.headers()) {
            tracing::debug!(
                gate = %self.name,
                request_id = %request_id(request.headers()),
                uri = %request.uri(),
                "Websocket upgrade, skipping inspection"
            );
            metrics::record_outcome("bypass");
            return Decision::Forward(request);
        }

        match self.check(request).await {
            Ok(decision) => decision,
            Err(Failure { error, request }) => {
                match policy::resolve(&self.name, &error, request, self.config.interrupt_on_error) {
                    Resolution::Interrupt(response) => Decision::Respond(response),
                    Resolution::Continue(request) => Decision::Forward(request),
                }
            }
        }
    }

    async fn check(&self, request: Request<Body>) -> Result<Decision, Failure> {
        let (parts, body) = request.into_parts();

        let captured = match capture(body, self.config.max_body_size).await {
            Ok(bytes) => bytes,
            Err(CaptureError::TooLarge { limit, body }) => {
                return Err(Failure {
                    error: GateError::BodyTooLarge { limit },
                    request: Request::from_parts(parts, body),
                });
            }
            Err(CaptureError::Read { error, body }) => {
                return Err(Failure {
                    error: GateError::BodyRead(Box::new(error)),
                    request: Request::from_parts(parts, body),
                });
            }
        };

        let verdict_request = VerdictRequest::mirror(
            &self.config.modsecurity_url,
            &parts,
            captured.clone(),
            &self.header_filter,
        );
        let request = Request::from_parts(parts, Body::from(captured));

        let started = Instant::now();
        let verdict = match self.send(verdict_request).await {
            Ok(verdict) => verdict,
            Err(error) => return Err(Failure { error, request }),
        };

        let status = verdict.status();
        metrics::record_verdict(status, started);

        if status.as_u16() >= 500 {
            tracing::error!(
                gate = %self.name,
                request_id = %request_id(request.headers()),
                method = %request.method(),
                uri = %request.uri(),
                headers = ?request.headers(),
                status = %status,
                verdict_headers = ?verdict.headers(),
                "ModSecurity answered with a server error"
            );
        }

        let outcome = arbitrate(status, self.config.ignore_500_error);
        metrics::record_outcome(outcome.as_str());

        match outcome {
            Verdict::Allow => Ok(Decision::Forward(request)),
            Verdict::Block => {
                tracing::info!(
                    gate = %self.name,
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    uri = %request.uri(),
                    status = %status,
                    "Request blocked"
                );
                Ok(Decision::Respond(relay(verdict)))
            }
        }
    }

    /// Send through the transport, turning a panic inside it into an error.
    async fn send(&self, request: VerdictRequest) -> Result<Response<Body>, GateError> {
        match AssertUnwindSafe(self.transport.send(request)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(GateError::Unexpected(format!("Panic. Error: {message}")))
            }
        }
    }
}
