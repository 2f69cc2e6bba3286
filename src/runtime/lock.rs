//! Advisory file locks shared between concurrent CLI invocations.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use log::debug;
use std::fs::OpenOptions;
use std::path::Path;

use super::{LockGuard, RealRuntime};

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) async fn lock_exclusive_impl(&self, path: &Path) -> Result<LockGuard> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || lock_blocking(&path))
            .await
            .context("Lock task failed")?
    }
}

fn lock_blocking(path: &Path) -> Result<LockGuard> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;

    debug!("Waiting for lock on {}", path.display());
    FileExt::lock_exclusive(&file)
        .with_context(|| format!("Failed to acquire lock on {}", path.display()))?;

    // Released when the file handle is dropped.
    Ok(Box::new(file))
}
