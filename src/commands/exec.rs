use anyhow::Result;
use log::debug;

use super::config::Config;
use super::invocation::{CommandOptions, Invocation};
use super::loader::LoaderRegistry;
use super::registration::CommandRegistry;
use crate::error::ScaffoldError;
use crate::install::PackageInstaller;
use crate::package::{PackageCache, PackageOptions};
use crate::registry::Registry;
use crate::runtime::Runtime;

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command is not backed by a package; nothing was touched.
    Skipped,
    /// The entry point ran and exited with this code.
    Exited(i32),
}

/// Runs registered commands from their cached packages in a child process.
pub struct Dispatcher<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a Config,
    registry: &'a dyn Registry,
    installer: &'a dyn PackageInstaller,
    commands: CommandRegistry,
    loaders: LoaderRegistry,
}

impl<'a, R: Runtime> Dispatcher<'a, R> {
    pub fn new(
        runtime: &'a R,
        config: &'a Config,
        registry: &'a dyn Registry,
        installer: &'a dyn PackageInstaller,
    ) -> Self {
        Self {
            runtime,
            config,
            registry,
            installer,
            commands: CommandRegistry::builtin(),
            loaders: LoaderRegistry::default(),
        }
    }

    pub fn with_commands(mut self, commands: CommandRegistry) -> Self {
        self.commands = commands;
        self
    }

    #[tracing::instrument(skip(self, options))]
    pub async fn dispatch(
        &self,
        command: &str,
        args: &[String],
        options: CommandOptions,
    ) -> Result<DispatchOutcome> {
        let Some(package) = self.commands.get(command) else {
            debug!("{} is not a packaged command", command);
            return Ok(DispatchOutcome::Skipped);
        };

        let (target_path, store_dir) = match &self.config.target_path {
            Some(path) => (path.clone(), None),
            None => (
                self.config.dependencies_dir(),
                Some(self.config.store_dir()),
            ),
        };
        debug!("target path: {}", target_path.display());
        debug!("store dir: {:?}", store_dir);

        let use_cache = store_dir.is_some();
        let mut cache = PackageCache::new(
            self.runtime,
            self.registry,
            self.installer,
            PackageOptions {
                target_path,
                store_dir,
                package_name: package.name.clone(),
                package_version: package.version_spec.clone(),
            },
        )?;

        if use_cache {
            if cache.exists().await? {
                cache.update().await?;
            } else {
                cache.install().await?;
            }
            debug!("Using {}@{}", cache.name(), cache.version());
        }

        let entry = cache.root_file_path()?.ok_or_else(|| {
            ScaffoldError::NotFound(format!("entry point of {}", package.name))
        })?;
        debug!("entry point: {}", entry.display());

        let payload = Invocation {
            args: args.to_vec(),
            options: CommandOptions {
                debug: self.config.debug,
                ..options
            },
        }
        .to_json()?;
        let cwd = self.runtime.current_dir()?;
        let spec = self.loaders.command(&entry, &payload, &cwd)?;

        let code = self.runtime.run_inherited(&spec).await?;
        debug!("{} exited with code {}", spec.program, code);
        Ok(DispatchOutcome::Exited(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registration::INIT_PACKAGE as NAME;
    use crate::error::kind_of;
    use crate::install::MockPackageInstaller;
    use crate::package::{MANIFEST_FILE, PackageRef, slot_path};
    use crate::registry::{DEFAULT_REGISTRY, MockRegistry};
    use crate::runtime::{MockRuntime, ProcessSpec};
    use crate::test_utils::{test_home, test_store};
    use std::path::{Path, PathBuf};

    fn config(target_path: Option<PathBuf>) -> Config {
        Config {
            home_dir: test_home(),
            cli_home: test_home().join(".scaffold"),
            target_path,
            registry_url: DEFAULT_REGISTRY.to_string(),
            debug: false,
            check_update: false,
        }
    }

    fn registry_with_latest(latest: &'static str) -> MockRegistry {
        let mut registry = MockRegistry::new();
        registry
            .expect_url()
            .returning(|| DEFAULT_REGISTRY.to_string());
        registry
            .expect_resolve_latest()
            .returning(move |_| Ok(Some(latest.to_string())));
        registry
    }

    /// A runtime where only `existing` paths exist and `manifest` declares `main`.
    fn runtime_with(existing: Vec<PathBuf>, manifest: PathBuf, main: &'static str) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(move |p| existing.iter().any(|e| e == p));
        runtime
            .expect_read_to_string()
            .withf(move |p| p == manifest.as_path())
            .returning(move |_| Ok(format!(r#"{{"main":"{}"}}"#, main)));
        runtime.expect_current_dir().returning(|| Ok(test_home()));
        runtime
    }

    fn init_options() -> CommandOptions {
        CommandOptions::new("init")
    }

    #[tokio::test]
    async fn test_unknown_command_touches_nothing() {
        let runtime = MockRuntime::new();
        let registry = MockRegistry::new();
        let installer = MockPackageInstaller::new();
        let config = config(None);

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let outcome = dispatcher
            .dispatch("unknown-command", &[], CommandOptions::new("unknown-command"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_cached_package_is_updated_and_run() {
        let slot = slot_path(&test_store(), NAME, "1.0.1");
        let mut runtime = runtime_with(
            vec![test_store(), slot.clone(), slot.join(MANIFEST_FILE)],
            slot.join(MANIFEST_FILE),
            "lib/index.js",
        );
        let entry = slot.join("lib").join("index.js");
        runtime
            .expect_run_inherited()
            .withf(move |spec: &ProcessSpec| {
                spec.program == "node"
                    && spec.cwd == test_home()
                    && spec.args[1].contains(&serde_json::to_string(&entry.to_string_lossy()).unwrap())
                    && spec.args[1].contains(r#"["my-app",{"schemaVersion":1,"name":"init""#)
            })
            .times(1)
            .returning(|_| Ok(0));

        let registry = registry_with_latest("1.0.1");
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().times(0);
        let config = config(None);

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let outcome = dispatcher
            .dispatch("init", &["my-app".to_string()], init_options())
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Exited(0));
    }

    #[tokio::test]
    async fn test_missing_package_is_installed_then_run() {
        let slot = slot_path(&test_store(), NAME, "1.0.1");
        let manifest = slot.join(MANIFEST_FILE);
        let mut runtime = MockRuntime::new();
        let existing = vec![test_store(), manifest.clone()];
        runtime
            .expect_exists()
            .returning(move |p| existing.iter().any(|e| e == p));
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"main":"bin/init"}"#.into()));
        runtime.expect_current_dir().returning(|| Ok(test_home()));
        let program = slot.join("bin").join("init");
        runtime
            .expect_run_inherited()
            .withf(move |spec: &ProcessSpec| Path::new(&spec.program) == program)
            .times(1)
            .returning(|_| Ok(3));

        let registry = registry_with_latest("1.0.1");
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_install()
            .withf(|req| req.packages[0].name == NAME && req.packages[0].version == "1.0.1")
            .times(1)
            .returning(|_| Ok(()));
        let config = config(None);

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let outcome = dispatcher.dispatch("init", &[], init_options()).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Exited(3));
    }

    #[tokio::test]
    async fn test_target_path_bypasses_cache() {
        let local = test_home().join("local-init");
        let mut runtime = runtime_with(
            vec![local.join(MANIFEST_FILE)],
            local.join(MANIFEST_FILE),
            "index.js",
        );
        runtime.expect_create_dir_all().times(0);
        runtime
            .expect_run_inherited()
            .times(1)
            .returning(|_| Ok(0));

        let mut registry = MockRegistry::new();
        registry.expect_resolve_latest().times(0);
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().times(0);
        let config = config(Some(local));

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let outcome = dispatcher.dispatch("init", &[], init_options()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Exited(0));
    }

    #[tokio::test]
    async fn test_missing_entry_point_never_spawns() {
        let local = test_home().join("empty");
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime.expect_run_inherited().times(0);

        let registry = MockRegistry::new();
        let installer = MockPackageInstaller::new();
        let config = config(Some(local));

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let err = dispatcher
            .dispatch("init", &["my-app".to_string()], init_options())
            .await
            .unwrap_err();

        assert!(matches!(kind_of(&err), Some(ScaffoldError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let local = test_home().join("local-init");
        let mut runtime = runtime_with(
            vec![local.join(MANIFEST_FILE)],
            local.join(MANIFEST_FILE),
            "index.js",
        );
        runtime
            .expect_run_inherited()
            .returning(|_| Err(ScaffoldError::Spawn("node: not found".into()).into()));

        let registry = MockRegistry::new();
        let installer = MockPackageInstaller::new();
        let config = config(Some(local));

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let err = dispatcher.dispatch("init", &[], init_options()).await.unwrap_err();
        assert!(matches!(kind_of(&err), Some(ScaffoldError::Spawn(_))));
    }

    #[tokio::test]
    async fn test_debug_flag_comes_from_config() {
        let local = test_home().join("local-init");
        let mut runtime = runtime_with(
            vec![local.join(MANIFEST_FILE)],
            local.join(MANIFEST_FILE),
            "index.js",
        );
        runtime
            .expect_run_inherited()
            .withf(|spec: &ProcessSpec| spec.args[1].contains(r#""force":false,"debug":true}"#))
            .times(1)
            .returning(|_| Ok(0));

        let registry = MockRegistry::new();
        let installer = MockPackageInstaller::new();
        let config = Config {
            debug: true,
            ..config(Some(local))
        };

        let dispatcher = Dispatcher::new(&runtime, &config, &registry, &installer);
        let outcome = dispatcher.dispatch("init", &[], init_options()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Exited(0));
    }

    #[tokio::test]
    async fn test_custom_command_registration() {
        let local = test_home().join("publish");
        let mut runtime = runtime_with(
            vec![local.join(MANIFEST_FILE)],
            local.join(MANIFEST_FILE),
            "index.js",
        );
        runtime.expect_run_inherited().returning(|_| Ok(0));

        let registry = MockRegistry::new();
        let installer = MockPackageInstaller::new();
        let config = config(Some(local));

        let mut commands = CommandRegistry::new();
        commands.register("publish", PackageRef::latest("@imooc-cli/publish"));
        let dispatcher =
            Dispatcher::new(&runtime, &config, &registry, &installer).with_commands(commands);

        assert_eq!(
            dispatcher.dispatch("init", &[], init_options()).await.unwrap(),
            DispatchOutcome::Skipped
        );
        assert_eq!(
            dispatcher
                .dispatch("publish", &[], CommandOptions::new("publish"))
                .await
                .unwrap(),
            DispatchOutcome::Exited(0)
        );
    }
}
