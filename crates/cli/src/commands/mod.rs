use std::path::Path;

use enum_dispatch::enum_dispatch;
use synthetics_sdk::{
    model::MarketsSnapshot,
    oracle::{prices_from_tickers, OracleKeeper},
    schema::{LoadedSnapshot, SnapshotFile},
};

use crate::config::{Config, DisplayOptions};

use self::{
    init_config::InitConfig, leaderboard::Leaderboard, market::Market, oracle::Oracle,
    position::Position, route::Route,
};

mod init_config;
mod leaderboard;
mod market;
mod oracle;
mod position;
mod route;
mod utils;

/// Commands.
#[enum_dispatch]
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Initialize config file.
    InitConfig(InitConfig),
    /// Find the best swap route.
    Route(Route),
    /// Commands for markets.
    Market(Market),
    /// Value positions.
    Position(Position),
    /// Commands for the oracle keeper.
    Oracle(Oracle),
    /// Leaderboards.
    Leaderboard(Leaderboard),
}

#[enum_dispatch(Commands)]
pub(crate) trait Command {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()>;
}

/// Command context.
pub(crate) struct Context<'a> {
    config_path: &'a Path,
    config: &'a Config,
}

impl<'a> Context<'a> {
    pub(super) fn new(config_path: &'a Path, config: &'a Config) -> Self {
        Self {
            config_path,
            config,
        }
    }

    pub(crate) fn config_path(&self) -> &Path {
        self.config_path
    }

    pub(crate) fn config(&self) -> &Config {
        self.config
    }

    /// Load and validate the snapshot file, with prices refreshed from the
    /// oracle keeper if `live` is set.
    pub(crate) async fn load(&self, live: bool) -> eyre::Result<LoadedSnapshot> {
        let path = self.config.snapshot_path();
        tracing::debug!(path = %path.display(), "loading snapshot");
        let mut loaded = SnapshotFile::from_path(&path)?.validate()?;
        if !live {
            return Ok(loaded);
        }

        let keeper = self.oracle_keeper(loaded.chain_id)?;
        let tickers = keeper.tickers().await?;
        let prices = prices_from_tickers(loaded.snapshot.tokens(), &tickers);
        tracing::info!(prices = prices.len(), "refreshed prices");
        loaded.snapshot = loaded.snapshot.with_prices(&prices);
        Ok(loaded)
    }

    /// Create an oracle keeper client, for `chain_id` if given.
    pub(crate) fn oracle_keeper(&self, chain_id: Option<u64>) -> eyre::Result<OracleKeeper> {
        let config = match chain_id {
            Some(chain_id) => self.config.oracle.for_chain(chain_id),
            None => self.config.oracle.clone(),
        };
        let keeper = OracleKeeper::try_new(config)?;
        tracing::debug!(url = %keeper.current_url(), "using oracle keeper");
        Ok(keeper)
    }

    /// Load the markets snapshot.
    pub(crate) async fn snapshot(&self, live: bool) -> eyre::Result<MarketsSnapshot> {
        Ok(self.load(live).await?.snapshot)
    }

    /// Print a serializable item.
    pub(crate) fn print_one(
        &self,
        item: impl serde::Serialize,
        options: DisplayOptions,
    ) -> eyre::Result<()> {
        println!("{}", self.config.output.display_one(item, options)?);
        Ok(())
    }

    /// Print a list of serializable items.
    pub(crate) fn print_many(
        &self,
        items: impl IntoIterator<Item = impl serde::Serialize>,
        options: DisplayOptions,
    ) -> eyre::Result<()> {
        println!("{}", self.config.output.display_many(items, options)?);
        Ok(())
    }
}
