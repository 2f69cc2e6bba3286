use log::{debug, warn};

use crate::registry::Registry;
use crate::registry::version::is_newer;

/// Name this CLI is published under.
pub const CLI_PACKAGE: &str = "scaffold-cli";

/// Warns when a newer compatible release of the CLI itself is published.
///
/// Never fails: registry errors are logged at debug level and ignored.
#[tracing::instrument(skip(registry))]
pub async fn check_global_update(registry: &dyn Registry, current_version: &str) -> Option<String> {
    match registry
        .resolve_compatible(current_version, CLI_PACKAGE)
        .await
    {
        Ok(Some(latest)) if is_newer(&latest, current_version) => {
            warn!(
                "Please update {}: current version {}, latest version {}. Run: cargo install {}",
                CLI_PACKAGE, current_version, latest, CLI_PACKAGE
            );
            Some(latest)
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Update check failed: {:#}", e);
            None
        }
    }
}
