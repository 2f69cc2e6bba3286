//! Cache slot addressing and entry-point lookup.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use super::manifest::{MANIFEST_FILE, PackageManifest};
use crate::runtime::Runtime;
use crate::runtime::path::absolutize;

/// Makes a package name safe to use as a single path component.
pub fn escape_name(package_name: &str) -> String {
    package_name.replace(['/', '\\'], "_")
}

/// `{store_dir}/_{escaped}@{version}@{name}`.
///
/// Both the escaped and the raw name are embedded so that two names whose
/// escaped forms coincide (`a/b` and `a_b`) still get distinct slots.
pub fn slot_path(store_dir: &Path, package_name: &str, version: &str) -> PathBuf {
    store_dir.join(format!(
        "_{}@{}@{}",
        escape_name(package_name),
        version,
        package_name
    ))
}

/// Walks upward from `search_path` to the nearest manifest and resolves its
/// `main` entry to an absolute, normalized path.
///
/// Returns `None` when no manifest is found, or when the nearest one declares
/// no `main`.
#[tracing::instrument(skip(runtime))]
pub fn root_file_path<R: Runtime>(runtime: &R, search_path: &Path) -> Result<Option<PathBuf>> {
    let start = if search_path.is_absolute() {
        search_path.to_path_buf()
    } else {
        absolutize(&runtime.current_dir()?, search_path)
    };

    let Some(dir) = start
        .ancestors()
        .find(|dir| runtime.exists(&dir.join(MANIFEST_FILE)))
    else {
        debug!("No {} above {}", MANIFEST_FILE, start.display());
        return Ok(None);
    };

    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = PackageManifest::load(runtime, &manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;

    Ok(manifest
        .entry()
        .map(|main| resolve_entry(runtime, &absolutize(dir, Path::new(main)))))
}

/// Resolves `main` the way `require` does: the file itself, then with a
/// `.js` suffix, then a directory's `index.js`.
///
/// Falls back to `main` unchanged so the loader reports the missing file.
pub fn resolve_entry<R: Runtime>(runtime: &R, main: &Path) -> PathBuf {
    if runtime.exists(main) {
        if !runtime.is_dir(main) {
            return main.to_path_buf();
        }
        let index = main.join("index.js");
        if runtime.exists(&index) {
            return index;
        }
        return main.to_path_buf();
    }

    let mut with_js = main.as_os_str().to_owned();
    with_js.push(".js");
    let with_js = PathBuf::from(with_js);
    if runtime.exists(&with_js) {
        debug!("Resolved {} to {}", main.display(), with_js.display());
        return with_js;
    }
    main.to_path_buf()
}
