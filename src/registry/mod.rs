//! Registry client: package documents, published versions and version resolution.

pub mod version;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::http::HttpClient;

/// Registry used when none is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// The subset of a registry package document this crate reads.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct PackageDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub versions: BTreeMap<String, VersionDocument>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct VersionDocument {
    #[serde(default)]
    pub dist: Option<Dist>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Dist {
    pub tarball: String,
}

impl PackageDocument {
    /// Every published version key, malformed ones included.
    pub fn version_keys(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }

    /// Tarball URL for a concrete version, if the registry published one.
    pub fn tarball_url(&self, version: &str) -> Option<&str> {
        self.versions
            .get(version)
            .and_then(|v| v.dist.as_ref())
            .map(|d| d.tarball.as_str())
    }
}

/// Joins a registry base URL and a package name with exactly one slash.
pub fn metadata_url(registry_url: &str, package_name: &str) -> String {
    format!(
        "{}/{}",
        registry_url.trim_end_matches('/'),
        package_name.trim_start_matches('/')
    )
}

/// Read access to a package registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Base URL of this registry.
    fn url(&self) -> String;

    /// `GET {url}/{package_name}`. `None` for an empty name or a non-2xx status.
    async fn fetch_metadata(&self, package_name: &str) -> Result<Option<PackageDocument>>;

    /// All published version keys; empty when the package is unknown.
    async fn list_versions(&self, package_name: &str) -> Result<Vec<String>>;

    /// The greatest published version under semver ordering.
    async fn resolve_latest(&self, package_name: &str) -> Result<Option<String>>;

    /// The greatest published version satisfying `^base_version`.
    async fn resolve_compatible(
        &self,
        base_version: &str,
        package_name: &str,
    ) -> Result<Option<String>>;
}

/// npm-compatible registry over HTTP.
pub struct NpmRegistry {
    http_client: HttpClient,
    registry_url: String,
}

impl NpmRegistry {
    pub fn new(http_client: HttpClient, registry_url: Option<String>) -> Self {
        Self {
            http_client,
            registry_url: registry_url.unwrap_or_else(|| DEFAULT_REGISTRY.to_string()),
        }
    }
}

#[async_trait]
impl Registry for NpmRegistry {
    fn url(&self) -> String {
        self.registry_url.clone()
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_metadata(&self, package_name: &str) -> Result<Option<PackageDocument>> {
        if package_name.is_empty() {
            return Ok(None);
        }

        let url = metadata_url(&self.registry_url, package_name);
        debug!("Fetching package document from {}...", url);
        self.http_client.get_json_opt(&url).await
    }

    async fn list_versions(&self, package_name: &str) -> Result<Vec<String>> {
        Ok(self
            .fetch_metadata(package_name)
            .await?
            .map(|doc| doc.version_keys())
            .unwrap_or_default())
    }

    async fn resolve_latest(&self, package_name: &str) -> Result<Option<String>> {
        let versions = self.list_versions(package_name).await?;
        Ok(version::latest(&versions))
    }

    async fn resolve_compatible(
        &self,
        base_version: &str,
        package_name: &str,
    ) -> Result<Option<String>> {
        let versions = self.list_versions(package_name).await?;
        Ok(version::latest_compatible(base_version, &versions))
    }
}
