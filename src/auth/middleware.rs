//! Authentication gate.
//!
//! Runs in front of every route. `GET /` is the health check and always
//! passes. Every other request must present a token that exists in the
//! credential table.
//!
//! An identity claimed through basic auth is compared with the identity on
//! record only to emit a warning; the token alone decides access.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use crate::auth::credentials::CredentialStore;
use crate::auth::extract::{extract_credential, ExtractError};
use crate::http::request::request_id;
use crate::observability::metrics;

/// Path of the health check route exempt from authentication.
pub const HEALTH_CHECK_PATH: &str = "/";

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Health check; credentials were not inspected.
    Exempt,
    /// Token found. Carries the identity on record.
    Allow { identity: String },
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Deny)
    }
}

pub fn is_exempt(method: &Method, path: &str) -> bool {
    method == Method::GET && path == HEALTH_CHECK_PATH
}

/// Decide whether `request` may proceed. Logs every decision.
pub fn evaluate(store: &CredentialStore, request: &Request<Body>) -> Decision {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let path = request.uri().path();
    let request_id = request_id(request);

    if is_exempt(request.method(), path) {
        tracing::info!(ip = %ip, "healthcheck request - always allowed");
        metrics::record_auth_decision("exempt");
        return Decision::Exempt;
    }

    let credential = match extract_credential(request.headers()) {
        Ok(credential) => credential,
        Err(ExtractError::Missing) => {
            tracing::warn!(request_id, ip = %ip, path = %path, "forbidden request - no credentials");
            metrics::record_auth_decision("denied");
            return Decision::Deny;
        }
        Err(ExtractError::Malformed { header, reason }) => {
            tracing::error!(request_id, ip = %ip, path = %path, auth_header = %header, reason, "got bad auth header");
            metrics::record_auth_decision("malformed");
            return Decision::Deny;
        }
    };

    match store.identity_for(credential.token()) {
        Some(identity) => {
            if let Some(claimed) = credential.claimed_identity() {
                if claimed != identity {
                    tracing::warn!(
                        user_from_map = %identity,
                        user_from_token = %claimed,
                        "username in map doesn't match username in basic auth token"
                    );
                }
            }
            tracing::info!(request_id, user = %identity, ip = %ip, path = %path, "user authenticated");
            metrics::record_auth_decision("allowed");
            Decision::Allow {
                identity: identity.to_string(),
            }
        }
        None => {
            tracing::warn!(request_id, ip = %ip, path = %path, "forbidden request");
            metrics::record_auth_decision("denied");
            Decision::Deny
        }
    }
}

/// The uniform deny response.
pub fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Forbidden\n",
    )
        .into_response()
}

/// Axum middleware applying [`evaluate`]. Allowed requests run inside a span
/// carrying the caller's identity.
pub async fn auth_middleware(
    State(store): State<Arc<CredentialStore>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match evaluate(&store, &request) {
        Decision::Exempt => next.run(request).await,
        Decision::Allow { identity } => {
            let span = tracing::info_span!("authenticated", user = %identity);
            next.run(request).instrument(span).await
        }
        Decision::Deny => forbidden(),
    }
}
