/// Configuration.
pub mod config;

/// Commands.
pub mod commands;

use std::{ops::Deref, path::PathBuf};

use clap::Parser;
use commands::{Command, Commands, Context};
use config::{Config, ConfigArgs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

const ENV_PREFIX: &str = "SYNCTL_";
const CONFIG_DIR: &str = "synctl";

/// We use `__` in the name of environment variable as an alias of `.`.
///
/// See [`Env`] for more infomation.
const DOT_ALIAS: &str = "__";

/// Command-line interface for synthetics markets.
#[derive(Debug)]
pub struct Cli {
    config_path: PathBuf,
    config: Config,
    command: Commands,
}

impl Cli {
    /// Creates from the command line arguments.
    ///
    /// The config is layered as defaults, then the config file, then
    /// `SYNCTL_`-prefixed environment variables, then command line options.
    pub fn init() -> eyre::Result<Self> {
        let cli = Inner::parse();

        let config_path = cli.find_config()?;
        let Inner { args, command, .. } = cli;

        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed(ENV_PREFIX).split(DOT_ALIAS))
            .merge(Serialized::defaults(args))
            .extract()?;

        Ok(Self {
            config_path,
            config,
            command,
        })
    }

    /// Execute command.
    pub async fn execute(&self) -> eyre::Result<()> {
        self.command
            .execute(Context::new(&self.config_path, &self.config))
            .await
    }
}

impl Deref for Cli {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

/// Command-line interface for synthetics markets.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Inner {
    /// Path to the config file.
    #[clap(long = "config", short, global = true)]
    config_path: Option<PathBuf>,
    /// Config overrides.
    #[command(flatten)]
    args: ConfigArgs,
    /// Commands.
    #[command(subcommand)]
    command: Commands,
}

impl Inner {
    fn find_config(&self) -> eyre::Result<PathBuf> {
        use etcetera::{choose_base_strategy, BaseStrategy};

        match self.config_path.as_ref() {
            Some(path) => Ok(path.clone()),
            None => {
                let strategy = choose_base_strategy()?;
                Ok(strategy.config_dir().join(CONFIG_DIR).join("config.toml"))
            }
        }
    }
}
