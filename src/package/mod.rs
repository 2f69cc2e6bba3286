//! Local package cache: slot addressing, manifests and the cache manager.

mod cache;
mod manifest;
mod path;

pub use cache::{PackageCache, PackageOptions, TEMPLATE_DIR};
pub use manifest::{MANIFEST_FILE, PackageManifest};
pub use path::{escape_name, root_file_path, slot_path};

/// Sentinel version spec meaning "whatever the registry considers newest".
pub const LATEST: &str = "latest";

/// A package name plus a version spec (concrete version, `latest`, or a range).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    pub name: String,
    pub version_spec: String,
}

impl PackageRef {
    pub fn latest(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version_spec: LATEST.to_string(),
        }
    }
}
