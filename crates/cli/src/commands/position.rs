use std::path::PathBuf;

use rust_decimal::Decimal;
use synthetics_sdk::{
    model::{
        constants::USD_DECIMALS, params::ActionKind, position::DecreasePositionAmounts,
        BigInt, MarketsSnapshot, PositionInfo,
    },
    schema::LoadedSnapshot,
    utils::{amount_to_decimal, decimal_to_amount},
};

use crate::config::DisplayOptions;

use super::{
    utils::{decimals, format_amount, format_bps, format_usd, read_json, symbol},
    Command, Context,
};

/// Value positions.
#[derive(Debug, clap::Args)]
pub struct Position {
    /// JSON file with a list of positions.
    #[arg(long, short)]
    file: PathBuf,
    /// Estimate closing `CLOSE` USD of every position.
    #[arg(long, value_name = "CLOSE")]
    close: Option<Decimal>,
    /// Withdraw collateral in proportion to the closed size.
    #[arg(long, requires = "close")]
    keep_leverage: bool,
    /// Refresh prices from the oracle keeper.
    #[arg(long)]
    live: bool,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionOutput {
    account: String,
    market: String,
    side: &'static str,
    collateral: String,
    size_usd: String,
    collateral_usd: String,
    entry_price: Option<String>,
    mark_price: String,
    liquidation_price: Option<String>,
    pnl: String,
    pnl_rate: String,
    pnl_after_fees: String,
    pnl_after_fees_rate: String,
    pending_fees_usd: String,
    closing_fee_usd: String,
    net_value: String,
    leverage: Option<String>,
    has_low_collateral: bool,
    close: Option<CloseOutput>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CloseOutput {
    size_delta_usd: String,
    collateral_delta: String,
    realized_pnl_usd: String,
    is_full_close: bool,
    is_collateral_withdrawal_dropped: bool,
    next_size_usd: String,
    next_collateral_usd: String,
    next_leverage: Option<String>,
    next_liquidation_price: Option<String>,
    execution_fee_usd: Option<String>,
}

impl PositionOutput {
    fn new(snapshot: &MarketsSnapshot, info: &PositionInfo) -> Self {
        let position = &info.position;
        Self {
            account: position.account.to_string(),
            market: position.market.to_string(),
            side: if position.is_long { "long" } else { "short" },
            collateral: symbol(snapshot, &position.collateral_token),
            size_usd: format_usd(&position.size_in_usd),
            collateral_usd: format_usd(&info.collateral_usd),
            entry_price: info.entry_price.as_ref().map(format_usd),
            mark_price: format_usd(&info.mark_price),
            liquidation_price: info.liquidation_price.as_ref().map(format_usd),
            pnl: format_usd(&info.pnl),
            pnl_rate: format_bps(&info.pnl_basis_points),
            pnl_after_fees: format_usd(&info.pnl_after_fees),
            pnl_after_fees_rate: format_bps(&info.pnl_after_fees_percentage),
            pending_fees_usd: format_usd(&info.pending_fees_usd),
            closing_fee_usd: format_usd(&info.closing_fee_usd),
            net_value: format_usd(&info.net_value),
            leverage: info.leverage.as_ref().map(format_leverage),
            has_low_collateral: info.has_low_collateral,
            close: None,
        }
    }
}

impl CloseOutput {
    fn new(
        loaded: &LoadedSnapshot,
        collateral_decimals: u8,
        amounts: &DecreasePositionAmounts,
    ) -> Self {
        let execution_fee_usd = loaded.gas_price.as_ref().and_then(|gas_price| {
            loaded
                .snapshot
                .execution_fee(&loaded.gas_limits, gas_price, ActionKind::Decrease, 0)
                .map(|fee| format_usd(&fee.fee_usd))
        });
        Self {
            size_delta_usd: format_usd(&amounts.size_delta_usd),
            collateral_delta: format_amount(&amounts.collateral_delta_amount, collateral_decimals),
            realized_pnl_usd: format_usd(&amounts.realized_pnl_usd),
            is_full_close: amounts.is_full_close,
            is_collateral_withdrawal_dropped: amounts.is_collateral_withdrawal_dropped,
            next_size_usd: format_usd(&amounts.next_size_usd),
            next_collateral_usd: format_usd(&amounts.next_collateral_usd),
            next_leverage: amounts.next_leverage.as_ref().map(format_leverage),
            next_liquidation_price: amounts.next_liquidation_price.as_ref().map(format_usd),
            execution_fee_usd,
        }
    }
}

/// Format leverage given in basis points, e.g. `12.5x`.
fn format_leverage(leverage: &BigInt) -> String {
    match amount_to_decimal(leverage, 4) {
        Some(leverage) => format!("{}x", leverage.round_dp(2).normalize()),
        None => format!("{leverage} bps"),
    }
}

impl Command for Position {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let loaded = ctx.load(self.live).await?;
        let snapshot = &loaded.snapshot;
        let positions: Vec<synthetics_sdk::model::Position> = read_json(&self.file)?;
        let close = self
            .close
            .map(|usd| decimal_to_amount(usd, USD_DECIMALS))
            .transpose()?;

        let mut outputs = Vec::with_capacity(positions.len());
        for position in positions.iter().filter(|position| !position.is_empty()) {
            let Some(info) = snapshot.position_info(position) else {
                tracing::warn!(
                    account = %position.account,
                    market = %position.market,
                    "skipped a position that cannot be valued"
                );
                continue;
            };
            let mut output = PositionOutput::new(snapshot, &info);
            if let Some(size_delta_usd) = close.as_ref() {
                let collateral_decimals = decimals(snapshot, &position.collateral_token)?;
                output.close = snapshot
                    .decrease_position_amounts(
                        position,
                        size_delta_usd,
                        &BigInt::default(),
                        self.keep_leverage,
                    )
                    .map(|amounts| CloseOutput::new(&loaded, collateral_decimals, &amounts));
            }
            outputs.push(output);
        }

        ctx.print_many(
            outputs,
            DisplayOptions::table_projection([
                ("account", "Account"),
                ("market", "Market"),
                ("side", "Side"),
                ("collateral", "Collateral"),
                ("sizeUsd", "Size"),
                ("markPrice", "Mark Price"),
                ("liquidationPrice", "Liq. Price"),
                ("pnlAfterFees", "PnL After Fees"),
                ("pnlAfterFeesRate", "PnL After Fees %"),
                ("leverage", "Leverage"),
                ("hasLowCollateral", "Low Collateral"),
                ("close.realizedPnlUsd", "Close PnL"),
                ("close.nextSizeUsd", "Next Size"),
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leverage_format() {
        assert_eq!(format_leverage(&BigInt::from(125_000)), "12.5x");
        assert_eq!(format_leverage(&BigInt::from(10_000)), "1x");
    }
}
