//! The installer capability: fetches package versions into a store directory.
//!
//! The cache manager only knows the [`PackageInstaller`] trait. The shipped
//! implementation, [`TarballInstaller`], downloads the registry tarball for
//! each requested version and unpacks it into its cache slot.

mod extract;
mod tarball;

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub use extract::extract_tgz;
pub use tarball::TarballInstaller;

/// One concrete package version to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub name: String,
    pub version: String,
}

/// Everything the installer needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Directory the cache lives under (the parent of `store_dir`).
    pub root: PathBuf,
    pub store_dir: PathBuf,
    pub registry_url: String,
    pub packages: Vec<PackageRequest>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Installs every requested package into its slot under `store_dir`.
    /// Installing a version whose slot already exists is a no-op.
    async fn install(&self, request: &InstallRequest) -> Result<()>;
}
