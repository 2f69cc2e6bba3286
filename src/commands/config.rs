use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::error::ScaffoldError;
use crate::registry::DEFAULT_REGISTRY;
use crate::runtime::{Runtime, normalize_path};
use crate::runtime::path::absolutize;

/// CLI home under the user's home directory when none is configured.
pub const DEFAULT_CLI_HOME: &str = ".scaffold";
/// Cache target directory under the CLI home.
pub const DEPENDENCIES_DIR: &str = "dependencies";
/// Store directory under the cache target directory.
pub const STORE_DIR: &str = "node_modules";

/// Raw values collected from flags and environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    pub home: Option<PathBuf>,
    pub target_path: Option<PathBuf>,
    pub registry: Option<String>,
    pub debug: bool,
    pub no_update_check: bool,
}

/// Immutable configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub home_dir: PathBuf,
    pub cli_home: PathBuf,
    /// Local package directory that bypasses the cache.
    pub target_path: Option<PathBuf>,
    pub registry_url: String,
    pub debug: bool,
    pub check_update: bool,
}

impl Config {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, args: ConfigArgs) -> Result<Self> {
        let home_dir = runtime
            .home_dir()
            .filter(|home| runtime.exists(home))
            .ok_or_else(|| ScaffoldError::Config("user home directory does not exist".into()))?;

        // An absolute --home replaces the user home entirely.
        let cli_home = home_dir.join(args.home.unwrap_or_else(|| PathBuf::from(DEFAULT_CLI_HOME)));

        let target_path = match args.target_path {
            Some(path) if path.is_absolute() => Some(normalize_path(&path)),
            Some(path) => Some(absolutize(&runtime.current_dir()?, &path)),
            None => None,
        };

        let config = Self {
            home_dir,
            cli_home,
            target_path,
            registry_url: args
                .registry
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGISTRY.to_string()),
            debug: args.debug,
            check_update: !args.no_update_check,
        };
        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// `{cli_home}/dependencies`
    pub fn dependencies_dir(&self) -> PathBuf {
        self.cli_home.join(DEPENDENCIES_DIR)
    }

    /// `{cli_home}/dependencies/node_modules`
    pub fn store_dir(&self) -> PathBuf {
        self.dependencies_dir().join(STORE_DIR)
    }
}
