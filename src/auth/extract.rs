//! Credential extraction from request headers.
//!
//! # Priority
//! 1. `X-Auth-Token`: used verbatim when present and non-empty.
//! 2. `Authorization: Basic base64(identity:token)`.
//!
//! Anything else is treated as missing credentials.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Header carrying a bare token.
pub const X_AUTH_TOKEN: &str = "x-auth-token";

const BASIC_PREFIX: &str = "Basic ";

/// Credentials presented by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Token from the explicit header. Asserts no identity.
    Token(String),
    /// Identity/token pair from basic auth. The identity is advisory.
    Basic { identity: String, token: String },
}

impl Credential {
    pub fn token(&self) -> &str {
        match self {
            Credential::Token(token) => token,
            Credential::Basic { token, .. } => token,
        }
    }

    /// Identity claimed by the caller, if any.
    pub fn claimed_identity(&self) -> Option<&str> {
        match self {
            Credential::Token(_) => None,
            Credential::Basic { identity, .. } if !identity.is_empty() => Some(identity),
            Credential::Basic { .. } => None,
        }
    }
}

/// Why no credential could be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no auth token")]
    Missing,
    #[error("got a bad auth header: {reason}")]
    Malformed { header: String, reason: &'static str },
}

/// Pull the caller's credential out of `headers`.
pub fn extract_credential(headers: &HeaderMap) -> Result<Credential, ExtractError> {
    let explicit = headers
        .get(X_AUTH_TOKEN)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .filter(|v| !v.is_empty());
    if let Some(token) = explicit {
        return Ok(Credential::Token(token.to_string()));
    }

    match headers.get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => match value.to_str() {
            Ok(raw) => parse_basic_auth(raw),
            Err(_) => Err(ExtractError::Malformed {
                header: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                reason: "header is not visible ASCII",
            }),
        },
        _ => Err(ExtractError::Missing),
    }
}

/// Decode a `Basic` authorization header value into identity and token.
pub fn parse_basic_auth(raw: &str) -> Result<Credential, ExtractError> {
    let malformed = |reason: &'static str| ExtractError::Malformed {
        header: raw.to_string(),
        reason,
    };

    let encoded = raw
        .strip_prefix(BASIC_PREFIX)
        .ok_or_else(|| malformed("missing Basic scheme"))?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| malformed("invalid base64"))?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed("decoded value is not UTF-8"))?;

    let mut fields = decoded.split(':');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(identity), Some(token), None) => Ok(Credential::Basic {
            identity: identity.to_string(),
            token: token.to_string(),
        }),
        _ => Err(malformed("expected exactly one ':' separator")),
    }
}
