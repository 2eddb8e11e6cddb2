//! Rule composition.
//!
//! The composed document is the base document followed by each requested
//! overlay in request order, each preceded by a blank line and followed by a
//! newline. Requests are never deduplicated or reordered.
//!
//! Failures split into two severities:
//! - hard: the base document or the catalog is unavailable; nothing is returned
//! - soft: an unknown overlay or one that vanished between listing and fetching
//!   is logged and left out

use std::sync::Arc;

use thiserror::Error;

use crate::observability::metrics;
use crate::rules::repository::{RepositoryError, RuleRepository, BASE_DOCUMENT};

/// Requested name that selects nothing beyond the base document.
pub const DEFAULT_SELECTION: &str = "default";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("couldn't load base rules document")]
    BaseDocumentMissing(#[source] RepositoryError),
    #[error("couldn't list available rulesets")]
    CatalogUnavailable(#[source] RepositoryError),
}

/// Builds composed documents from a repository.
#[derive(Clone)]
pub struct RuleComposer {
    repository: Arc<dyn RuleRepository>,
}

impl RuleComposer {
    pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
        Self { repository }
    }

    /// Compose the base document with the overlays named in `rulesets`.
    pub fn build_rules<S: AsRef<str>>(&self, rulesets: &[S]) -> Result<String, ComposeError> {
        let result = self.compose(rulesets);
        metrics::record_composition(if result.is_ok() { "ok" } else { "error" });
        result
    }

    fn compose<S: AsRef<str>>(&self, rulesets: &[S]) -> Result<String, ComposeError> {
        let mut rules = self.repository.get(BASE_DOCUMENT).map_err(|e| {
            tracing::error!(error = %e, "couldn't load default rules file!");
            ComposeError::BaseDocumentMissing(e)
        })?;
        let available = self
            .repository
            .list()
            .map_err(ComposeError::CatalogUnavailable)?;

        for ruleset in rulesets {
            let ruleset = ruleset.as_ref().to_lowercase();
            if ruleset == DEFAULT_SELECTION {
                tracing::debug!("skipping default ruleset");
                continue;
            }
            if !available.contains(&ruleset) {
                tracing::warn!(ruleset = %ruleset, "tried to request a non-existent ruleset, continuing");
                metrics::record_overlay_skipped("unknown");
                continue;
            }
            match self.repository.get(&ruleset) {
                Ok(overlay) => {
                    rules.push_str("\n\n");
                    rules.push_str(&overlay);
                    rules.push('\n');
                }
                Err(e) => {
                    tracing::warn!(ruleset = %ruleset, error = %e, "failed to get ruleset, continuing");
                    metrics::record_overlay_skipped("fetch_failed");
                }
            }
        }
        Ok(rules)
    }
}

impl std::fmt::Debug for RuleComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleComposer").finish_non_exhaustive()
    }
}
