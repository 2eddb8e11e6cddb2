//! Rule document storage.
//!
//! # Responsibilities
//! - Enumerate overlay documents available in a flat namespace
//! - Fetch a document body by normalized name
//!
//! # Design Decisions
//! - Names are lowercase with the `.yaml`/`.yml` extension stripped
//! - `_default` is the base document and never appears in the catalog
//! - Nothing is cached; every call observes the backend as it is now
//! - Storage access is synchronous; async callers use the blocking pool

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reserved name of the base document.
pub const BASE_DOCUMENT: &str = "_default";

/// Extensions tried by `get`, in order of preference.
pub const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("rule document `{0}` not found")]
    NotFound(String),
    #[error("rule backend unavailable: {0}")]
    Unavailable(#[source] std::io::Error),
}

/// A source of named rule documents.
pub trait RuleRepository: Send + Sync {
    /// Names of every overlay document currently available.
    fn list(&self) -> Result<BTreeSet<String>, RepositoryError>;

    /// Body of the document called `name`.
    fn get(&self, name: &str) -> Result<String, RepositoryError>;
}

/// Normalize a backend entry name into an overlay name.
///
/// Returns `None` for entries without a recognized extension.
pub fn document_name(entry: &str) -> Option<String> {
    let lower = entry.to_lowercase();
    let stem = EXTENSIONS
        .iter()
        .find_map(|ext| lower.strip_suffix(ext)?.strip_suffix('.'))?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Documents stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct FsRuleRepository {
    root: PathBuf,
}

impl FsRuleRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RuleRepository for FsRuleRepository {
    fn list(&self) -> Result<BTreeSet<String>, RepositoryError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            tracing::error!(dir = %self.root.display(), error = %e, "Couldn't iterate rules directory");
            RepositoryError::Unavailable(e)
        })?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(RepositoryError::Unavailable)?;
            // no subdirectories
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().and_then(document_name) else {
                continue;
            };
            if name != BASE_DOCUMENT {
                names.insert(name);
            }
        }
        Ok(names)
    }

    fn get(&self, name: &str) -> Result<String, RepositoryError> {
        if !is_plain_name(name) {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        fs::metadata(&self.root).map_err(RepositoryError::Unavailable)?;

        for ext in EXTENSIONS {
            let path = self.root.join(format!("{}.{}", name, ext));
            match fs::read_to_string(&path) {
                Ok(body) => return Ok(body),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Rule file unreadable");
                    continue;
                }
            }
        }
        tracing::error!(rulefile = %name, "couldn't read rule file with yaml or yml extension");
        Err(RepositoryError::NotFound(name.to_string()))
    }
}

/// Documents held in memory, keyed by entry name including extension.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuleRepository {
    entries: HashMap<String, String>,
}

impl MemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under `entry`, e.g. `sample.yml`.
    pub fn with_document(mut self, entry: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(entry, body);
        self
    }

    pub fn insert(&mut self, entry: impl Into<String>, body: impl Into<String>) {
        self.entries.insert(entry.into(), body.into());
    }

    pub fn remove(&mut self, entry: &str) -> Option<String> {
        self.entries.remove(entry)
    }
}

impl RuleRepository for MemoryRuleRepository {
    fn list(&self) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(self
            .entries
            .keys()
            .filter_map(|entry| document_name(entry))
            .filter(|name| name != BASE_DOCUMENT)
            .collect())
    }

    fn get(&self, name: &str) -> Result<String, RepositoryError> {
        EXTENSIONS
            .iter()
            .find_map(|ext| self.entries.get(&format!("{}.{}", name, ext)))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_document_name() {
        assert_eq!(document_name("sample.yml").as_deref(), Some("sample"));
        assert_eq!(document_name("Sample.YAML").as_deref(), Some("sample"));
        assert_eq!(document_name("_default.yaml").as_deref(), Some("_default"));
        assert_eq!(document_name("notes.txt"), None);
        assert_eq!(document_name("yml"), None);
        assert_eq!(document_name(".yml"), None);
    }

    #[test]
    fn test_fs_list_filters_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_default.yaml"), "base").unwrap();
        fs::write(dir.path().join("Sample.yml"), "s").unwrap();
        fs::write(dir.path().join("extra.yaml"), "e").unwrap();
        fs::write(dir.path().join("README.md"), "docs").unwrap();
        fs::create_dir(dir.path().join("nested.yml")).unwrap();

        let repo = FsRuleRepository::new(dir.path());
        assert_eq!(repo.list().unwrap(), names(&["extra", "sample"]));
    }

    #[test]
    fn test_fs_list_missing_directory() {
        let repo = FsRuleRepository::new("/definitely/not/rules");
        assert!(matches!(repo.list(), Err(RepositoryError::Unavailable(_))));
        assert!(matches!(repo.get(BASE_DOCUMENT), Err(RepositoryError::Unavailable(_))));
    }

    #[test]
    fn test_fs_get_prefers_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("both.yaml"), "long").unwrap();
        fs::write(dir.path().join("both.yml"), "short").unwrap();
        fs::write(dir.path().join("only.yml"), "short").unwrap();

        let repo = FsRuleRepository::new(dir.path());
        assert_eq!(repo.get("both").unwrap(), "long");
        assert_eq!(repo.get("only").unwrap(), "short");
        assert!(matches!(repo.get("absent"), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_fs_get_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("inner.yml"), "x").unwrap();

        let repo = FsRuleRepository::new(dir.path());
        assert!(matches!(repo.get("sub/inner"), Err(RepositoryError::NotFound(_))));
        assert!(matches!(repo.get(".."), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_memory_repository() {
        let repo = MemoryRuleRepository::new()
            .with_document("_default.yml", "D")
            .with_document("sample.yml", "S")
            .with_document("other.yaml", "O");

        assert_eq!(repo.list().unwrap(), names(&["other", "sample"]));
        assert_eq!(repo.get(BASE_DOCUMENT).unwrap(), "D");
        assert_eq!(repo.get("other").unwrap(), "O");
        assert!(matches!(repo.get("missing"), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_memory_repository_catalog_changes() {
        let mut repo = MemoryRuleRepository::new()
            .with_document("_default.yml", "D")
            .with_document("sample.yml", "S");

        repo.insert("late.yml", "L");
        assert_eq!(repo.list().unwrap(), names(&["late", "sample"]));

        assert_eq!(repo.remove("sample.yml").as_deref(), Some("S"));
        assert_eq!(repo.remove("sample.yml"), None);
        assert_eq!(repo.list().unwrap(), names(&["late"]));
        assert!(matches!(repo.get("sample"), Err(RepositoryError::NotFound(_))));
    }
}
