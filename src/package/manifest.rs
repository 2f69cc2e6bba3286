use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::runtime::Runtime;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// The fields of a package manifest this crate cares about.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
}

impl PackageManifest {
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let manifest: PackageManifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// The declared entry file, ignoring an empty `main`.
    pub fn entry(&self) -> Option<&str> {
        self.main.as_deref().filter(|m| !m.trim().is_empty())
    }
}
