use std::path::{Path, PathBuf};

use synthetics_sdk::{
    leaderboard::{
        rank_accounts, rank_positions, AccountPerf, AccountPositionsSummary,
        LiveAccountPerformance, OpenPosition, OpenPositionRecord, PerfPeriod, RankBy, Ranked,
    },
    model::MarketsSnapshot,
};

use crate::config::DisplayOptions;

use super::{
    utils::{format_bps, format_usd, read_json, symbol},
    Command, Context,
};

/// Leaderboards.
#[derive(Debug, clap::Args)]
pub struct Leaderboard {
    /// JSON file with the open position records.
    #[arg(long, global = true)]
    positions: Option<PathBuf>,
    /// Refresh prices from the oracle keeper.
    #[arg(long, global = true)]
    live: bool,
    #[command(subcommand)]
    command: LeaderboardCommand,
}

#[derive(Debug, clap::Subcommand)]
enum LeaderboardCommand {
    /// Rank accounts.
    Accounts {
        /// JSON file with the closed-trade aggregates of accounts.
        #[arg(long)]
        perfs: PathBuf,
        /// Only use the aggregates of this period.
        #[arg(long, value_enum, default_value_t)]
        period: PerfPeriod,
        /// Ranking key.
        #[arg(long, value_enum, default_value_t)]
        by: RankBy,
        /// Only show the top `TOP` accounts.
        #[arg(long)]
        top: Option<usize>,
    },
    /// Rank open positions.
    Positions {
        /// Only show the top `TOP` positions.
        #[arg(long)]
        top: Option<usize>,
    },
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountRow {
    rank: usize,
    account: String,
    abs_profit: String,
    rel_profit: String,
    realized_pnl: String,
    unrealized_pnl: String,
    average_size: String,
    average_leverage: String,
    wins: u64,
    losses: u64,
}

impl From<&Ranked<LiveAccountPerformance>> for AccountRow {
    fn from(ranked: &Ranked<LiveAccountPerformance>) -> Self {
        let perf = &ranked.item;
        Self {
            rank: ranked.rank,
            account: perf.account.to_string(),
            abs_profit: format_usd(&perf.abs_profit),
            rel_profit: format_bps(&perf.rel_profit),
            realized_pnl: format_usd(&perf.realized_pnl),
            unrealized_pnl: format_usd(&perf.unrealized_pnl),
            average_size: format_usd(&perf.average_size),
            average_leverage: format_bps(&perf.average_leverage),
            wins: perf.wins,
            losses: perf.losses,
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionRow {
    rank: usize,
    account: String,
    market: String,
    side: &'static str,
    collateral: String,
    size_usd: String,
    pnl_after_fees: String,
    liquidation_price: Option<String>,
    liquidation_distance: Option<String>,
}

impl PositionRow {
    fn new(snapshot: &MarketsSnapshot, ranked: &Ranked<OpenPosition>) -> Self {
        let position = &ranked.item;
        Self {
            rank: ranked.rank,
            account: position.account.to_string(),
            market: position.market.to_string(),
            side: if position.is_long { "long" } else { "short" },
            collateral: symbol(snapshot, &position.collateral_token),
            size_usd: format_usd(&position.size_in_usd),
            pnl_after_fees: format_usd(&position.unrealized_pnl_after_fees),
            liquidation_price: position.liquidation_price.as_ref().map(format_usd),
            liquidation_distance: position.liquidation_price_delta_rel.as_ref().map(format_bps),
        }
    }
}

fn load_positions(
    snapshot: &MarketsSnapshot,
    path: Option<&Path>,
) -> eyre::Result<Vec<OpenPosition>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let records: Vec<OpenPositionRecord> = read_json(path)?;
    let positions = OpenPosition::from_records(snapshot, &records);
    tracing::info!(
        records = records.len(),
        valued = positions.len(),
        "loaded open positions"
    );
    Ok(positions)
}

impl Command for Leaderboard {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let snapshot = ctx.snapshot(self.live).await?;
        let positions = load_positions(&snapshot, self.positions.as_deref())?;

        match &self.command {
            LeaderboardCommand::Accounts {
                perfs,
                period,
                by,
                top,
            } => {
                let perfs: Vec<AccountPerf> = read_json(perfs)?;
                let summaries = AccountPositionsSummary::by_account(&positions);
                let ranked = rank_accounts(
                    perfs.iter().filter(|perf| perf.period == *period),
                    &summaries,
                    *by,
                );
                let rows = ranked
                    .iter()
                    .take(top.unwrap_or(usize::MAX))
                    .map(AccountRow::from)
                    .collect::<Vec<_>>();
                ctx.print_many(
                    rows,
                    DisplayOptions::table_projection([
                        ("rank", "#"),
                        ("account", "Account"),
                        ("absProfit", "Profit"),
                        ("relProfit", "Profit %"),
                        ("averageSize", "Avg. Size"),
                        ("averageLeverage", "Avg. Leverage"),
                        ("wins", "Wins"),
                        ("losses", "Losses"),
                    ]),
                )
            }
            LeaderboardCommand::Positions { top } => {
                if self.positions.is_none() {
                    eyre::bail!("`--positions` is required to rank positions");
                }
                let rows = rank_positions(positions)
                    .iter()
                    .take(top.unwrap_or(usize::MAX))
                    .map(|ranked| PositionRow::new(&snapshot, ranked))
                    .collect::<Vec<_>>();
                ctx.print_many(rows, DisplayOptions::default())
            }
        }
    }
}
