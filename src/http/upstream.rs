//! Forwarding to the protected upstream.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the configured upstream
//! - Forward with the pooled hyper client, streaming both bodies
//! - Tunnel protocol upgrades (websocket) once the upstream switches
//!
//! # Design Decisions
//! - Headers are forwarded as received
//! - Upstream connection errors become 502 Bad Gateway

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use hyper::upgrade::OnUpgrade;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioIo},
};

use crate::config::ValidationError;
use crate::gate::request_id;

/// The single upstream behind the gate.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    /// Target `url`; only its scheme and authority are used.
    pub fn new(url: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidUrl {
            field: "upstream.url",
            value: url.to_string(),
        };

        let uri: Uri = url.parse().map_err(|_| invalid())?;
        let parts = uri.into_parts();
        let (Some(scheme), Some(authority)) = (parts.scheme, parts.authority) else {
            return Err(invalid());
        };

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            scheme,
            authority,
        })
    }

    fn rewrite(&self, uri: &Uri) -> Result<Uri, axum::http::uri::InvalidUriParts> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts)
    }
}

/// Handler forwarding every request to the upstream.
pub async fn forward(State(upstream): State<Upstream>, mut request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();

    let client_upgrade = request
        .headers()
        .contains_key(header::UPGRADE)
        .then(|| hyper::upgrade::on(&mut request));

    let (mut parts, body) = request.into_parts();
    parts.uri = match upstream.rewrite(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to rewrite upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    parts.version = Version::HTTP_11;

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding to upstream"
    );

    let mut response = match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    if response.status() == StatusCode::SWITCHING_PROTOCOLS {
        if let Some(client_upgrade) = client_upgrade {
            let upstream_upgrade = hyper::upgrade::on(&mut response);
            tokio::spawn(tunnel(client_upgrade, upstream_upgrade, request_id));
        }
    }

    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

/// Copy bytes both ways between the upgraded client and upstream connections.
async fn tunnel(client: OnUpgrade, upstream: OnUpgrade, request_id: String) {
    let (client, upstream) = match tokio::try_join!(client, upstream) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Upgrade failed");
            return;
        }
    };

    let mut client = TokioIo::new(client);
    let mut upstream = TokioIo::new(upstream);
    match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
        Ok((sent, received)) => {
            tracing::debug!(request_id = %request_id, sent, received, "Upgraded connection closed");
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Upgraded connection aborted");
        }
    }
}
