use anyhow::Result;
use clap::Parser;
use log::{error, info};
use scaffold::commands::{self, CommandOptions, Config, ConfigArgs};
use scaffold::runtime::RealRuntime;
use std::path::PathBuf;

/// scaffold - project scaffolding from registry packages
///
/// Commands are implemented by packages fetched from an npm-compatible
/// registry. Each package is cached under the CLI home and its entry point
/// runs in a child process that inherits this terminal.
///
/// Examples:
///   scaffold init my-app               # Scaffold a project named my-app
///   scaffold --target-path ./tpl init  # Use a local package instead of the cache
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Local package directory to run instead of the cached package
    #[arg(
        long = "target-path",
        short = 't',
        env = "SCAFFOLD_TARGET_PATH",
        value_name = "DIR",
        global = true
    )]
    pub target_path: Option<PathBuf>,

    /// CLI home directory, relative to the user home (defaults to .scaffold)
    #[arg(long = "home", env = "SCAFFOLD_HOME", value_name = "DIR", global = true)]
    pub home: Option<PathBuf>,

    /// Package registry URL (defaults to https://registry.npmjs.org)
    #[arg(
        long = "registry",
        env = "SCAFFOLD_REGISTRY",
        value_name = "URL",
        global = true
    )]
    pub registry: Option<String>,

    /// Skip the check for a newer release of this CLI
    #[arg(long = "no-update-check", global = true)]
    pub no_update_check: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Initialize a new project
    Init(InitArgs),
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Name of the project to create
    #[arg(value_name = "PROJECT_NAME")]
    pub project_name: Option<String>,

    /// Initialize even if the target directory is not empty
    #[arg(long, short = 'f')]
    pub force: bool,
}

impl Cli {
    fn config_args(&self) -> ConfigArgs {
        ConfigArgs {
            home: self.home.clone(),
            target_path: self.target_path.clone(),
            registry: self.registry.clone(),
            debug: self.debug,
            no_update_check: self.no_update_check,
        }
    }

    /// Command name, positional arguments and forwarded options.
    fn invocation(&self) -> (&'static str, Vec<String>, CommandOptions) {
        match &self.command {
            Commands::Init(args) => (
                "init",
                args.project_name.iter().cloned().collect(),
                CommandOptions {
                    force: args.force,
                    ..CommandOptions::new("init")
                },
            ),
        }
    }
}

async fn try_main(cli: &Cli) -> Result<i32> {
    let runtime = RealRuntime;
    let config = Config::load(&runtime, cli.config_args())?;
    let (command, args, options) = cli.invocation();
    commands::run(runtime, &config, command, args, options).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    info!("{} {}", commands::CLI_PACKAGE, commands::VERSION);

    match try_main(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
