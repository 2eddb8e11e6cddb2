//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     FCS_AUTH env var or /secrets/auth.yml
//!     → credentials.rs (parse users: {token: identity})
//!     → Arc<CredentialStore> (immutable, lock-free reads)
//!
//! per request:
//!     → middleware.rs (health check exemption)
//!     → extract.rs (X-Auth-Token, then Basic auth)
//!     → CredentialStore lookup → allow / 403
//! ```

pub mod credentials;
pub mod extract;
pub mod middleware;

pub use credentials::{CredentialError, CredentialSource, CredentialStore};
pub use extract::{extract_credential, Credential, ExtractError, X_AUTH_TOKEN};
pub use middleware::{auth_middleware, evaluate, forbidden, Decision, HEALTH_CHECK_PATH};
