//! Error kinds surfaced by the package cache and dispatch layers.
//!
//! Every fallible function returns `anyhow::Result`; these kinds are wrapped
//! into `anyhow::Error` so the top-level CLI (and tests) can `downcast_ref`
//! to tell a configuration problem from a registry outage.

/// Typed failures of the scaffolding core.
#[derive(Debug)]
pub enum ScaffoldError {
    /// Invalid or missing configuration (empty package name, no home dir).
    Config(String),
    /// Registry unreachable or the transport failed mid-request.
    Network(String),
    /// No published versions, or no resolvable entry point.
    NotFound(String),
    /// The entry-point subprocess could not be started.
    Spawn(String),
}

impl std::fmt::Display for ScaffoldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaffoldError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScaffoldError::Network(msg) => write!(f, "Network error: {}", msg),
            ScaffoldError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ScaffoldError::Spawn(msg) => write!(f, "Failed to start command: {}", msg),
        }
    }
}

impl std::error::Error for ScaffoldError {}

/// Returns the typed kind carried by an `anyhow::Error`, if any.
pub fn kind_of(error: &anyhow::Error) -> Option<&ScaffoldError> {
    error.downcast_ref::<ScaffoldError>()
}
