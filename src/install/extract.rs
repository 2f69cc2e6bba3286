//! `.tgz` extraction through the [`Runtime`] file operations.

use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use log::debug;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

use crate::runtime::Runtime;
use crate::runtime::path::is_path_under;

/// Unpacks `archive_path` into `extract_to` and returns the directory that
/// holds the package contents.
///
/// Registry tarballs wrap everything in one top-level directory (`package/`);
/// when the archive has exactly one top-level directory, that directory is
/// returned instead of `extract_to` itself.
#[tracing::instrument(skip(runtime))]
pub fn extract_tgz<R: Runtime>(
    runtime: &R,
    archive_path: &Path,
    extract_to: &Path,
) -> Result<PathBuf> {
    debug!("Extracting {:?} to {:?}...", archive_path, extract_to);

    let file = runtime
        .open(archive_path)
        .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    runtime.create_dir_all(extract_to)?;

    for entry in archive.entries().context("Failed to read tar archive")? {
        let mut entry = entry.context("Failed to read tar entry")?;
        let entry_path = entry.path().context("Invalid path in tar entry")?.into_owned();

        if !is_safe_relative(&entry_path) {
            debug!("Skipping entry with unsafe path {:?}", entry_path);
            continue;
        }

        let full_path = extract_to.join(&entry_path);
        if !is_path_under(&full_path, extract_to) {
            debug!("Skipping entry outside extraction dir {:?}", entry_path);
            continue;
        }

        match entry.header().entry_type() {
            EntryType::Directory => runtime.create_dir_all(&full_path)?,
            EntryType::Regular | EntryType::Continuous => {
                if let Some(parent) = full_path.parent() {
                    runtime.create_dir_all(parent)?;
                }
                let mut dest = runtime.create_file(&full_path)?;
                std::io::copy(&mut entry, &mut dest)
                    .with_context(|| format!("Failed to extract file {:?}", full_path))?;

                #[cfg(unix)]
                if let Ok(mode) = entry.header().mode()
                    && let Err(e) = runtime.set_permissions(&full_path, mode & 0o777)
                {
                    debug!("Failed to set permissions on {:?}: {}", full_path, e);
                }
            }
            other => debug!("Skipping {:?} entry {:?}", other, entry_path),
        }
    }

    let entries = runtime
        .read_dir(extract_to)
        .context("Failed to read extraction directory")?;

    match entries.as_slice() {
        [] => Err(anyhow!("Archive appears to be empty.")),
        [single] if runtime.is_dir(single) => Ok(single.clone()),
        _ => Ok(extract_to.to_path_buf()),
    }
}

/// Only plain relative components are allowed in archive entries.
fn is_safe_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
