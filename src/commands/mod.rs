//! Command layer: configuration, service wiring and dispatch of packaged commands.

pub mod config;
mod exec;
pub mod invocation;
pub mod loader;
pub mod registration;
pub mod services;
mod update_check;

use anyhow::Result;

pub use config::{Config, ConfigArgs};
pub use exec::{DispatchOutcome, Dispatcher};
pub use invocation::{CommandOptions, Invocation};
pub use update_check::{CLI_PACKAGE, check_global_update};

use crate::runtime::Runtime;
use services::Services;

/// Version of this CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs one CLI command end to end and returns the process exit code.
#[tracing::instrument(skip(runtime, config, options))]
pub async fn run<R: Runtime + Clone>(
    runtime: R,
    config: &Config,
    command: &str,
    args: Vec<String>,
    options: CommandOptions,
) -> Result<i32> {
    let services = Services::from_config(runtime.clone(), config)?;

    if config.check_update {
        check_global_update(&services.registry, VERSION).await;
    }

    let dispatcher = Dispatcher::new(&runtime, config, &services.registry, &services.installer);
    match dispatcher.dispatch(command, &args, options).await? {
        DispatchOutcome::Exited(code) => Ok(code),
        DispatchOutcome::Skipped => Ok(0),
    }
}
