/// Output format.
pub mod output;

use std::{path::PathBuf, time::Duration};

use synthetics_sdk::{market_graph::MarketGraphConfig, oracle::OracleKeeperConfig};

pub use self::output::{DisplayOptions, OutputFormat};

const DEFAULT_SNAPSHOT: &str = "~/.config/synctl/snapshot.json";

/// Configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the markets snapshot file.
    pub snapshot: String,
    /// Output format.
    pub output: OutputFormat,
    /// Oracle keeper.
    pub oracle: OracleKeeperConfig,
    /// Routing.
    pub routing: MarketGraphConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot: DEFAULT_SNAPSHOT.to_string(),
            output: OutputFormat::default(),
            oracle: OracleKeeperConfig::default(),
            routing: MarketGraphConfig::default(),
        }
    }
}

impl Config {
    /// Returns the path to the snapshot file, with `~` expanded.
    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.snapshot).into_owned())
    }
}

/// Config overrides from the command line.
///
/// Only the options that are set are serialized, so that they override the
/// config file and the environment.
#[derive(Debug, Clone, Default, clap::Args, serde::Serialize)]
pub struct ConfigArgs {
    /// Path to the markets snapshot file.
    #[arg(long, short, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<String>,
    /// Output format.
    #[arg(long, short, global = true, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputFormat>,
    /// Oracle keeper options.
    #[command(flatten)]
    oracle: OracleArgs,
    /// Routing options.
    #[command(flatten)]
    routing: RoutingArgs,
}

#[serde_with::serde_as]
#[derive(Debug, Clone, Default, clap::Args, serde::Serialize)]
struct OracleArgs {
    /// Chain id.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    chain_id: Option<u64>,
    /// Oracle keeper URL. Can be repeated.
    #[arg(long = "oracle-url", global = true)]
    #[serde(rename = "urls", skip_serializing_if = "Vec::is_empty")]
    oracle_urls: Vec<String>,
    /// Timeout of each oracle request, e.g. `2s`.
    #[arg(long = "oracle-timeout", global = true, value_parser = humantime::parse_duration)]
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<serde_with::DurationMilliSeconds<u64>>")]
    oracle_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, clap::Args, serde::Serialize)]
struct RoutingArgs {
    /// Max number of swap steps.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_steps: Option<usize>,
}
