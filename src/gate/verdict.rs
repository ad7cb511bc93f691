//! Verdict requests to the decision service.
//!
//! # Responsibilities
//! - Mirror the inbound request against the decision-service base URL
//! - Send it through a pluggable transport with a short timeout
//! - Surface transport failures separately from verdicts
//!
//! # Data Flow
//! ```text
//! inbound parts + captured bytes
//!     → VerdictRequest::mirror (same method, path+query, filtered headers)
//!     → VerdictTransport::send
//!     → Response<Body> (status is the verdict) | GateError::Transport
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Response},
};
use bytes::Bytes;

use crate::gate::error::GateError;

/// Predicate deciding which inbound headers reach the decision service.
pub type HeaderFilter = Arc<dyn Fn(&HeaderName, &HeaderValue) -> bool + Send + Sync>;

/// Forwards everything except the framing headers the transport sets for
/// the new target.
pub fn default_header_filter(name: &HeaderName, _value: &HeaderValue) -> bool {
    *name != header::HOST && *name != header::CONTENT_LENGTH && *name != header::TRANSFER_ENCODING
}

/// A mirrored copy of an inbound request, aimed at the decision service.
#[derive(Debug, Clone)]
pub struct VerdictRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl VerdictRequest {
    /// Mirror `parts` with the captured `body` against `base_url`.
    pub fn mirror(base_url: &str, parts: &Parts, body: Bytes, filter: &HeaderFilter) -> Self {
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let mut headers = HeaderMap::with_capacity(parts.headers.len());
        for (name, value) in parts.headers.iter() {
            if filter(name, value) {
                headers.append(name.clone(), value.clone());
            }
        }

        Self {
            method: parts.method.clone(),
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
            headers,
            body,
        }
    }
}

/// Sends verdict requests. Implementations must be cheap to clone and safe
/// to share between concurrent requests.
pub trait VerdictTransport: Clone + Send + Sync + 'static {
    /// Send `request`, resolving to the decision service's full response.
    fn send(
        &self,
        request: VerdictRequest,
    ) -> impl Future<Output = Result<Response<Body>, GateError>> + Send;
}

/// Default transport: a pooled `reqwest` client with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose calls give up after `timeout`.
    ///
    /// The timeout covers the whole exchange, body included. The decision
    /// service is always dialed directly, never through environment proxies.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl VerdictTransport for HttpTransport {
    fn send(
        &self,
        request: VerdictRequest,
    ) -> impl Future<Output = Result<Response<Body>, GateError>> + Send {
        let client = self.client.clone();
        async move {
            let response = client
                .request(request.method, &request.url)
                .headers(request.headers)
                .body(request.body)
                .send()
                .await
                .map_err(|e| GateError::Transport(Box::new(e)))?;

            let status = response.status();
            let headers = response.headers().clone();

            let mut verdict = Response::new(Body::from_stream(response.bytes_stream()));
            *verdict.status_mut() = status;
            *verdict.headers_mut() = headers;
            Ok(verdict)
        }
    }
}
