//! Turns a resolved entry point into a child process command line.

use anyhow::{Result, anyhow};
use reqwest::Url;
use std::path::Path;

use crate::error::ScaffoldError;
use crate::runtime::ProcessSpec;

/// Knows how to start one kind of entry point.
pub trait EntryLoader: Send + Sync {
    fn can_load(&self, entry: &Path) -> bool;

    /// The command that loads `entry` and calls it with `payload` (a JSON array).
    fn command(&self, entry: &Path, payload: &str, cwd: &Path) -> Result<ProcessSpec>;
}

/// JavaScript modules, loaded with `node -e`.
pub struct NodeLoader;

const NODE_EXTENSIONS: &[&str] = &["js", "cjs", "mjs"];

impl EntryLoader for NodeLoader {
    fn can_load(&self, entry: &Path) -> bool {
        entry
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| NODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    fn command(&self, entry: &Path, payload: &str, cwd: &Path) -> Result<ProcessSpec> {
        let script = if is_es_module(entry) {
            // ES modules cannot be `require`d; import by file URL instead
            let url = Url::from_file_path(entry)
                .map_err(|_| anyhow!("entry point is not absolute: {}", entry.display()))?;
            format!(
                "import({}).then(m => (m.default ?? m).call(null, {}))",
                serde_json::to_string(url.as_str())?,
                payload
            )
        } else {
            let module = serde_json::to_string(&entry.to_string_lossy())?;
            format!("require({}).call(null, {})", module, payload)
        };
        Ok(ProcessSpec {
            program: "node".to_string(),
            args: vec!["-e".to_string(), script],
            cwd: cwd.to_path_buf(),
        })
    }
}

fn is_es_module(entry: &Path) -> bool {
    entry
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mjs"))
}

/// Anything else is executed directly with the payload as its only argument.
pub struct ExecutableLoader;

impl EntryLoader for ExecutableLoader {
    fn can_load(&self, _entry: &Path) -> bool {
        true
    }

    fn command(&self, entry: &Path, payload: &str, cwd: &Path) -> Result<ProcessSpec> {
        Ok(ProcessSpec {
            program: entry.to_string_lossy().into_owned(),
            args: vec![payload.to_string()],
            cwd: cwd.to_path_buf(),
        })
    }
}

/// Ordered loaders; the first one that accepts an entry wins.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn EntryLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    pub fn register(&mut self, loader: Box<dyn EntryLoader>) {
        self.loaders.push(loader);
    }

    pub fn find(&self, entry: &Path) -> Option<&dyn EntryLoader> {
        self.loaders
            .iter()
            .find(|loader| loader.can_load(entry))
            .map(|loader| loader.as_ref())
    }

    pub fn command(&self, entry: &Path, payload: &str, cwd: &Path) -> Result<ProcessSpec> {
        let loader = self.find(entry).ok_or_else(|| {
            ScaffoldError::NotFound(format!("no loader for entry point {}", entry.display()))
        })?;
        loader.command(entry, payload, cwd)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NodeLoader));
        registry.register(Box::new(ExecutableLoader));
        registry
    }
}
