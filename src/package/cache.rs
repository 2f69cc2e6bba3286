use anyhow::{Result, anyhow};
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::path::{root_file_path, slot_path};
use super::LATEST;
use crate::error::ScaffoldError;
use crate::install::{InstallRequest, PackageInstaller, PackageRequest};
use crate::registry::Registry;
use crate::runtime::Runtime;

/// Subdirectory of a cache slot holding the scaffolding payload.
pub const TEMPLATE_DIR: &str = "template";

/// Construction parameters for a [`PackageCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// Local directory used as-is when there is no store.
    pub target_path: PathBuf,
    /// Root holding the cache slots; `None` disables caching.
    pub store_dir: Option<PathBuf>,
    pub package_name: String,
    /// A concrete version or [`LATEST`].
    pub package_version: String,
}

/// One package in the local cache.
///
/// Holds a mutable version that starts out as whatever the caller asked
/// for (often [`LATEST`]) and is pinned to a concrete version by
/// [`prepare`](Self::prepare) and [`update`](Self::update).
pub struct PackageCache<'a, R: Runtime> {
    runtime: &'a R,
    registry: &'a dyn Registry,
    installer: &'a dyn PackageInstaller,
    target_path: PathBuf,
    store_dir: Option<PathBuf>,
    package_name: String,
    package_version: String,
}

impl<'a, R: Runtime> PackageCache<'a, R> {
    pub fn new(
        runtime: &'a R,
        registry: &'a dyn Registry,
        installer: &'a dyn PackageInstaller,
        options: PackageOptions,
    ) -> Result<Self> {
        if options.package_name.trim().is_empty() {
            return Err(ScaffoldError::Config("package name must not be empty".into()).into());
        }
        if options.package_version.trim().is_empty() {
            return Err(
                ScaffoldError::Config("package version must not be empty".into()).into(),
            );
        }

        Ok(Self {
            runtime,
            registry,
            installer,
            target_path: options.target_path,
            store_dir: options.store_dir,
            package_name: options.package_name,
            package_version: options.package_version,
        })
    }

    pub fn name(&self) -> &str {
        &self.package_name
    }

    /// The held version; [`LATEST`] until resolved.
    pub fn version(&self) -> &str {
        &self.package_version
    }

    /// Ensures the store exists and pins [`LATEST`] to a concrete version.
    #[tracing::instrument(skip(self), fields(package = %self.package_name))]
    pub async fn prepare(&mut self) -> Result<()> {
        if let Some(store_dir) = &self.store_dir
            && !self.runtime.exists(store_dir)
        {
            debug!("Creating store directory {}", store_dir.display());
            self.runtime.create_dir_all(store_dir)?;
        }

        if self.package_version == LATEST {
            self.package_version = self.resolve_latest().await?;
            debug!("Resolved {} to {}", LATEST, self.package_version);
        }
        Ok(())
    }

    /// Slot path for the held version.
    pub fn cache_file_path(&self) -> Result<PathBuf> {
        if self.package_version == LATEST {
            return Err(anyhow!(
                "version of {} has not been resolved yet",
                self.package_name
            ));
        }
        self.specific_cache_file_path(&self.package_version)
    }

    /// Slot path for an arbitrary concrete version of this package.
    pub fn specific_cache_file_path(&self, version: &str) -> Result<PathBuf> {
        Ok(slot_path(self.store()?, &self.package_name, version))
    }

    /// Whether the held version is present locally.
    ///
    /// Without a store this only checks that the target directory exists.
    pub async fn exists(&mut self) -> Result<bool> {
        if self.store_dir.is_some() {
            self.prepare().await?;
            Ok(self.runtime.exists(&self.cache_file_path()?))
        } else {
            Ok(self.runtime.exists(&self.target_path))
        }
    }

    /// Fetches the held version into the store.
    #[tracing::instrument(skip(self), fields(package = %self.package_name))]
    pub async fn install(&mut self) -> Result<()> {
        self.prepare().await?;
        let version = self.package_version.clone();
        self.install_version(&version).await
    }

    /// Moves to the newest published version, installing it if its slot is
    /// missing. The held version is rebound even when nothing was fetched.
    #[tracing::instrument(skip(self), fields(package = %self.package_name))]
    pub async fn update(&mut self) -> Result<()> {
        self.prepare().await?;

        let latest = self.resolve_latest().await?;
        let slot = self.specific_cache_file_path(&latest)?;
        if self.runtime.exists(&slot) {
            debug!("{}@{} already cached", self.package_name, latest);
        } else {
            info!(
                "Updating {} from {} to {}",
                self.package_name, self.package_version, latest
            );
            self.install_version(&latest).await?;
        }

        self.package_version = latest;
        Ok(())
    }

    /// Absolute path of the entry file declared by the package manifest.
    pub fn root_file_path(&self) -> Result<Option<PathBuf>> {
        let search_path = if self.store_dir.is_some() {
            self.cache_file_path()?.join(TEMPLATE_DIR)
        } else {
            self.target_path.clone()
        };
        root_file_path(self.runtime, &search_path)
    }

    async fn resolve_latest(&self) -> Result<String> {
        self.registry
            .resolve_latest(&self.package_name)
            .await?
            .ok_or_else(|| {
                ScaffoldError::NotFound(format!(
                    "no published versions of {} in {}",
                    self.package_name,
                    self.registry.url()
                ))
                .into()
            })
    }

    async fn install_version(&self, version: &str) -> Result<()> {
        let request = InstallRequest {
            root: self.target_path.clone(),
            store_dir: self.store()?.to_path_buf(),
            registry_url: self.registry.url(),
            packages: vec![PackageRequest {
                name: self.package_name.clone(),
                version: version.to_string(),
            }],
        };
        self.installer.install(&request).await
    }

    fn store(&self) -> Result<&Path> {
        self.store_dir.as_deref().ok_or_else(|| {
            ScaffoldError::Config(format!(
                "no store directory configured for {}",
                self.package_name
            ))
            .into()
        })
    }
}
