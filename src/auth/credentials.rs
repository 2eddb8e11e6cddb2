//! Token → identity table.
//!
//! Built once at startup and shared read-only behind an `Arc`. There is no
//! way to mutate a `CredentialStore` after construction.

use std::collections::HashMap;
use std::env::VarError;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthConfig;

/// Failure to build the credential table. Always fatal at startup.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("couldn't read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse credential document: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("credential document contains an empty token")]
    EmptyToken,
    #[error("environment variable {var} is set but is not valid UTF-8")]
    EnvNotUnicode { var: String },
}

/// Where the credential document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Document text supplied directly, usually through the environment.
    Inline(String),
    /// Document stored at a path on disk.
    File(PathBuf),
}

impl CredentialSource {
    /// Pick the source described by `config`: the environment variable when
    /// it is set, otherwise the configured file. A set but unreadable
    /// variable is an error, never a fallback to the file.
    pub fn from_config(config: &AuthConfig) -> Result<Self, CredentialError> {
        Self::select(&config.env_var, std::env::var(&config.env_var), &config.file)
    }

    fn select(
        var: &str,
        inline: Result<String, VarError>,
        file: &str,
    ) -> Result<Self, CredentialError> {
        match inline {
            Ok(text) => Ok(CredentialSource::Inline(text)),
            Err(VarError::NotPresent) => Ok(CredentialSource::File(PathBuf::from(file))),
            Err(VarError::NotUnicode(_)) => Err(CredentialError::EnvNotUnicode {
                var: var.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        match self {
            CredentialSource::Inline(_) => "environment".to_string(),
            CredentialSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CredentialDocument {
    users: HashMap<String, String>,
}

/// Immutable mapping from token to the identity it was issued to.
#[derive(Clone, Default)]
pub struct CredentialStore {
    tokens: HashMap<String, String>,
}

// Tokens are secrets; keep them out of logs.
impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl CredentialStore {
    /// Load the table from `source`. Either the whole document is accepted
    /// or an error is returned; there is no partial load.
    pub fn load(source: &CredentialSource) -> Result<Self, CredentialError> {
        let text = match source {
            CredentialSource::Inline(text) => text.clone(),
            CredentialSource::File(path) => {
                fs::read_to_string(path).map_err(|source| CredentialError::Read {
                    path: path.clone(),
                    source,
                })?
            }
        };
        let store = Self::parse(&text)?;

        if store.is_empty() {
            tracing::warn!(source = %source.describe(), "Credential table is empty, every request will be denied");
        } else {
            tracing::info!(source = %source.describe(), tokens = store.len(), "Credential table loaded");
        }
        Ok(store)
    }

    /// Parse a YAML credential document of the form `users: {token: identity}`.
    pub fn parse(text: &str) -> Result<Self, CredentialError> {
        let document: CredentialDocument = serde_yaml::from_str(text)?;
        if document.users.keys().any(|token| token.is_empty()) {
            return Err(CredentialError::EmptyToken);
        }
        Ok(Self {
            tokens: document.users,
        })
    }

    /// Identity on record for `token`, if the token is known.
    pub fn identity_for(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, String)> for CredentialStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            tokens: iter
                .into_iter()
                .filter(|(token, _)| !token.is_empty())
                .collect(),
        }
    }
}
