use rust_decimal::Decimal;
use synthetics_sdk::{
    market::{MarketCalculations, MarketStatus},
    model::{constants::USD_DECIMALS, Address, MarketInfo, MarketsSnapshot},
    utils::decimal_to_amount,
};

use crate::config::DisplayOptions;

use super::{
    utils::{find_market, find_token, format_usd, market_name},
    Command, Context,
};

/// Commands for markets.
#[derive(Debug, clap::Args)]
pub struct Market {
    #[command(subcommand)]
    command: MarketCommand,
}

#[derive(Debug, clap::Subcommand)]
enum MarketCommand {
    /// List markets.
    List {
        /// Refresh prices from the oracle keeper.
        #[arg(long)]
        live: bool,
    },
    /// Show the status of a market.
    Status {
        /// Market token address.
        market: String,
        /// Refresh prices from the oracle keeper.
        #[arg(long)]
        live: bool,
    },
    /// Find the market to open a position in.
    Best {
        /// Index token, by address or symbol.
        #[arg(long)]
        index: String,
        /// Collateral token, by address or symbol.
        #[arg(long)]
        collateral: String,
        /// Open a short position.
        #[arg(long)]
        short: bool,
        /// Size of the position in USD.
        #[arg(long)]
        size: Decimal,
        /// Refresh prices from the oracle keeper.
        #[arg(long)]
        live: bool,
    },
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketOutput {
    address: Address,
    name: String,
    is_spot_only: bool,
    liquidity_for_long: Option<String>,
    liquidity_for_short: Option<String>,
}

impl MarketOutput {
    fn new(snapshot: &MarketsSnapshot, info: &MarketInfo) -> Self {
        let status = snapshot.status(info.address()).ok();
        let liquidity = |is_long: bool| {
            status
                .as_ref()
                .map(|status: &MarketStatus| format_usd(status.liquidity(is_long)))
        };
        Self {
            address: info.address().clone(),
            name: market_name(snapshot, info),
            is_spot_only: info.market.is_spot_only,
            liquidity_for_long: liquidity(true),
            liquidity_for_short: liquidity(false),
        }
    }
}

impl Command for Market {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        match &self.command {
            MarketCommand::List { live } => {
                let snapshot = ctx.snapshot(*live).await?;
                let markets = snapshot
                    .markets()
                    .map(|info| MarketOutput::new(&snapshot, info))
                    .collect::<Vec<_>>();
                ctx.print_many(
                    markets,
                    DisplayOptions::table_projection([
                        ("name", "Name"),
                        ("address", "Address"),
                        ("liquidityForLong", "Long Liquidity"),
                        ("liquidityForShort", "Short Liquidity"),
                    ]),
                )
            }
            MarketCommand::Status { market, live } => {
                let snapshot = ctx.snapshot(*live).await?;
                let info = find_market(&snapshot, market)?;
                let status = snapshot.status(info.address())?;
                ctx.print_one(status, DisplayOptions::default())
            }
            MarketCommand::Best {
                index,
                collateral,
                short,
                size,
                live,
            } => {
                let snapshot = ctx.snapshot(*live).await?;
                let index = find_token(&snapshot, index)?;
                let collateral = find_token(&snapshot, collateral)?;
                let size = decimal_to_amount(*size, USD_DECIMALS)?;
                let best = snapshot
                    .best_market_for_position(&index.address, &collateral.address, !short, &size)
                    .ok_or_else(|| eyre::eyre!("no market has enough liquidity"))?;
                ctx.print_one(
                    MarketOutput::new(&snapshot, best.info),
                    DisplayOptions::default(),
                )
            }
        }
    }
}
