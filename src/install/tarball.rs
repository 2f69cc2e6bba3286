use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{InstallRequest, PackageInstaller, PackageRequest, extract_tgz};
use crate::error::ScaffoldError;
use crate::http::HttpClient;
use crate::package::slot_path;
use crate::registry::{PackageDocument, metadata_url};
use crate::runtime::Runtime;

/// Installs registry tarballs into cache slots.
///
/// Each slot is populated under an advisory `{slot}.lock` so two CLI runs
/// never unpack into the same slot at once; the slot directory only appears
/// once extraction has finished (extract to `{slot}_tmp`, then rename).
pub struct TarballInstaller<R: Runtime> {
    runtime: R,
    http_client: HttpClient,
}

impl<R: Runtime> TarballInstaller<R> {
    pub fn new(runtime: R, http_client: HttpClient) -> Self {
        Self {
            runtime,
            http_client,
        }
    }

    #[tracing::instrument(skip(self, store_dir, registry_url))]
    async fn install_one(
        &self,
        store_dir: &Path,
        registry_url: &str,
        package: &PackageRequest,
    ) -> Result<()> {
        let slot = slot_path(store_dir, &package.name, &package.version);
        let _lock = self
            .runtime
            .lock_exclusive(&with_suffix(&slot, ".lock"))
            .await?;

        if self.runtime.exists(&slot) {
            debug!("{} already present, skipping", slot.display());
            return Ok(());
        }

        let url = metadata_url(registry_url, &package.name);
        let document: PackageDocument =
            self.http_client.get_json_opt(&url).await?.ok_or_else(|| {
                ScaffoldError::NotFound(format!("package {} in {}", package.name, registry_url))
            })?;
        let tarball_url = document.tarball_url(&package.version).ok_or_else(|| {
            ScaffoldError::NotFound(format!(
                "tarball for {}@{}",
                package.name, package.version
            ))
        })?;

        let archive_path = with_suffix(&slot, ".tgz");
        let temp_dir = with_suffix(&slot, "_tmp");

        if let Some(parent) = slot.parent() {
            self.runtime.create_dir_all(parent)?;
        }
        if self.runtime.exists(&temp_dir) {
            debug!("Removing stale {}", temp_dir.display());
            self.runtime.remove_dir_all(&temp_dir)?;
        }

        info!("Installing {}@{}", package.name, package.version);
        let result = self
            .download_and_unpack(tarball_url, &archive_path, &temp_dir, &slot)
            .await;

        if self.runtime.exists(&archive_path) {
            let _ = self.runtime.remove_file(&archive_path);
        }
        if result.is_err() && self.runtime.exists(&temp_dir) {
            let _ = self.runtime.remove_dir_all(&temp_dir);
        }

        result
    }

    async fn download_and_unpack(
        &self,
        tarball_url: &str,
        archive_path: &Path,
        temp_dir: &Path,
        slot: &Path,
    ) -> Result<()> {
        self.http_client
            .download_file(tarball_url, || {
                self.runtime
                    .create_file(archive_path)
                    .with_context(|| format!("Failed to create {:?}", archive_path))
            })
            .await?;

        let contents = extract_tgz(&self.runtime, archive_path, temp_dir)?;
        self.runtime.rename(&contents, slot)?;

        if contents != temp_dir && self.runtime.exists(temp_dir) {
            self.runtime.remove_dir_all(temp_dir)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Runtime> PackageInstaller for TarballInstaller<R> {
    async fn install(&self, request: &InstallRequest) -> Result<()> {
        for package in &request.packages {
            self.install_one(&request.store_dir, &request.registry_url, package)
                .await?;
        }
        Ok(())
    }
}

/// `/a/b` + `.lock` -> `/a/b.lock`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}
