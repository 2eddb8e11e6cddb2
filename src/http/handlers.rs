use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::http::response::{text, ApiError};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RulesetQuery {
    pub rulesets: Option<String>,
}

impl RulesetQuery {
    /// Requested names in caller order. Empty or absent is a caller error.
    pub fn names(&self) -> Result<Vec<String>, ApiError> {
        match self.rulesets.as_deref() {
            None | Some("") => Err(ApiError::MissingRulesets),
            Some(list) => Ok(list.split(',').map(str::to_string).collect()),
        }
    }
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub async fn get_rules(
    State(state): State<AppState>,
    Query(query): Query<RulesetQuery>,
) -> Response {
    let names = match query.names() {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!("got request without rulesets");
            return e.into_response();
        }
    };
    match compose(&state, names).await {
        Ok(rules) => {
            tracing::debug!(bytes = rules.len(), "Served ruleset");
            text(rules)
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_sum(
    State(state): State<AppState>,
    Query(query): Query<RulesetQuery>,
) -> Response {
    let names = match query.names() {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!("got request without rulesets to sum");
            return e.into_response();
        }
    };
    match compose(&state, names).await {
        Ok(rules) => text(checksum(&rules)),
        Err(e) => e.into_response(),
    }
}

/// Lowercase hex SHA-256 of `rules`.
pub fn checksum(rules: &str) -> String {
    format!("{:x}", Sha256::digest(rules.as_bytes()))
}

async fn compose(state: &AppState, names: Vec<String>) -> Result<String, ApiError> {
    let composer = state.composer.clone();
    let joined = tokio::task::spawn_blocking(move || composer.build_rules(&names)).await;
    match joined {
        Ok(Ok(rules)) => Ok(rules),
        Ok(Err(e)) => {
            tracing::error!(error = %e, cause = ?std::error::Error::source(&e), "bad request to build rules");
            Err(ApiError::Internal)
        }
        Err(e) => {
            tracing::error!(error = %e, "rule composition task failed");
            Err(ApiError::Internal)
        }
    }
}
