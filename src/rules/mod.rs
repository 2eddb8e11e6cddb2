//! Rule document subsystem.
//!
//! # Data Flow
//! ```text
//! GET /ruleset?rulesets=a,b
//!     → composer.rs (base document + requested overlays, in order)
//!     → repository.rs (list catalog, fetch bodies)
//!     → backend (directory of .yaml/.yml files)
//! ```

pub mod composer;
pub mod repository;

pub use composer::{ComposeError, RuleComposer, DEFAULT_SELECTION};
pub use repository::{
    FsRuleRepository, MemoryRuleRepository, RepositoryError, RuleRepository, BASE_DOCUMENT,
};
