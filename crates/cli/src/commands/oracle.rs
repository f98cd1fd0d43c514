use synthetics_sdk::{
    model::Address,
    oracle::{prices_from_tickers, Period, DEFAULT_CANDLES_LIMIT},
};

use crate::config::DisplayOptions;

use super::{
    utils::{find_token, format_usd},
    Command, Context,
};

/// Commands for the oracle keeper.
#[derive(Debug, clap::Args)]
pub struct Oracle {
    #[command(subcommand)]
    command: OracleCommand,
}

#[derive(Debug, clap::Subcommand)]
enum OracleCommand {
    /// Fetch the latest prices of the tokens in the snapshot.
    Prices,
    /// Fetch price candles of a token.
    Candles {
        /// Token, by address or symbol.
        token: String,
        /// Candle period.
        #[arg(long, short, default_value = "1h")]
        period: Period,
        /// Max number of candles.
        #[arg(long, short, default_value_t = DEFAULT_CANDLES_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceOutput {
    symbol: String,
    address: Address,
    min: String,
    max: String,
}

impl Command for Oracle {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let loaded = ctx.load(false).await?;
        let keeper = ctx.oracle_keeper(loaded.chain_id)?;

        match &self.command {
            OracleCommand::Prices => {
                let tickers = keeper.tickers().await?;
                let prices = prices_from_tickers(loaded.snapshot.tokens(), &tickers);
                let outputs = loaded
                    .snapshot
                    .tokens()
                    .filter_map(|token| {
                        let price = prices.get(&token.address)?;
                        Some(PriceOutput {
                            symbol: token.symbol.clone(),
                            address: token.address.clone(),
                            min: format_usd(&price.min),
                            max: format_usd(&price.max),
                        })
                    })
                    .collect::<Vec<_>>();
                ctx.print_many(
                    outputs,
                    DisplayOptions::table_projection([
                        ("symbol", "Token"),
                        ("min", "Min Price"),
                        ("max", "Max Price"),
                        ("address", "Address"),
                    ]),
                )
            }
            OracleCommand::Candles {
                token,
                period,
                limit,
            } => {
                let token = find_token(&loaded.snapshot, token)?;
                let candles = keeper.candles(&token.symbol, *period, *limit).await?;
                ctx.print_many(candles, DisplayOptions::default())
            }
        }
    }
}
