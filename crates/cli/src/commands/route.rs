use rust_decimal::Decimal;
use synthetics_sdk::{
    market_graph::MarketGraph,
    model::{utils, MarketsSnapshot},
    route::SwapRoute,
    validation::{submit_error, SubmitParams, TradeMode, TradeType},
};

use crate::config::DisplayOptions;

use super::{
    utils::{find_token, format_amount, format_bps, format_usd, parse_amount, symbol},
    Command, Context,
};

/// Find the best swap route.
#[derive(Debug, clap::Args)]
pub struct Route {
    /// Token to swap from, by address or symbol.
    #[arg(long)]
    from: String,
    /// Token to swap to, by address or symbol.
    #[arg(long)]
    to: String,
    /// Amount to swap, in whole tokens.
    #[arg(long)]
    amount: Decimal,
    /// Balance of the token to swap from. The amount is checked against it.
    #[arg(long)]
    balance: Option<Decimal>,
    /// Refresh prices from the oracle keeper before routing.
    #[arg(long)]
    live: bool,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteOutput {
    from: String,
    to: String,
    path: Option<Vec<String>>,
    amount_in: String,
    amount_out: Option<String>,
    usd_in: Option<String>,
    usd_out: Option<String>,
    swap_fee_usd: Option<String>,
    price_impact_usd: Option<String>,
    total_fee_usd: Option<String>,
    total_fee_rate: Option<String>,
    error: Option<String>,
}

impl Command for Route {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let snapshot = ctx.snapshot(self.live).await?;
        let from = find_token(&snapshot, &self.from)?;
        let to = find_token(&snapshot, &self.to)?;
        let amount_in = parse_amount(from, self.amount)?;
        let balance = self
            .balance
            .map(|balance| parse_amount(from, balance))
            .transpose()?;

        let graph = MarketGraph::from_snapshot(&snapshot, ctx.config().routing);
        let route = SwapRoute::find(&snapshot, &graph, &from.address, &to.address, &amount_in)?;

        let error = submit_error(&SubmitParams {
            trade_type: TradeType::Swap,
            mode: TradeMode::Market,
            from_token: Some(from),
            from_balance: Some(balance.unwrap_or_else(|| amount_in.clone())),
            from_amount: Some(amount_in.clone()),
            to_token: Some(&to.address),
            swap_path: route.as_ref().map(|route| route.swap_path.as_slice()),
            has_liquidity: true,
            is_high_price_impact: false,
            is_high_price_impact_accepted: false,
            mark_price: None,
            trigger_price: None,
            swap_trigger_ratio: None,
            close_size_usd: None,
            leverage: None,
            max_leverage: None,
            collateral_usd: None,
            min_collateral_usd: None,
        });

        let output = render(&snapshot, self, route.as_ref(), error.map(|err| err.to_string()));
        ctx.print_one(output, DisplayOptions::default())
    }
}

fn render(
    snapshot: &MarketsSnapshot,
    args: &Route,
    route: Option<&SwapRoute>,
    error: Option<String>,
) -> RouteOutput {
    let mut output = RouteOutput {
        from: args.from.clone(),
        to: args.to.clone(),
        path: None,
        amount_in: args.amount.normalize().to_string(),
        amount_out: None,
        usd_in: None,
        usd_out: None,
        swap_fee_usd: None,
        price_impact_usd: None,
        total_fee_usd: None,
        total_fee_rate: None,
        error,
    };
    let Some(route) = route else {
        return output;
    };

    let out_decimals = snapshot
        .token(&route.token_out)
        .map(|token| token.decimals)
        .unwrap_or_default();
    output.path = Some(
        std::iter::once(symbol(snapshot, &route.token_in))
            .chain(
                route
                    .swap_fees
                    .iter()
                    .flat_map(|fees| fees.swaps.iter())
                    .map(|step| symbol(snapshot, &step.token_out)),
            )
            .collect(),
    );
    output.amount_out = Some(format_amount(&route.amount_out, out_decimals));
    output.usd_in = Some(format_usd(&route.usd_in));
    output.usd_out = Some(format_usd(&route.usd_out));
    if let Some(fees) = route.swap_fees.as_ref() {
        output.swap_fee_usd = Some(format_usd(&fees.total_swap_fee_usd));
        output.price_impact_usd = Some(format_usd(&fees.total_price_impact.impact_delta_usd));
        output.total_fee_usd = Some(format_usd(&fees.total_fee_usd));
        if let Some(first) = fees.swaps.first() {
            output.total_fee_rate = Some(format_bps(&utils::basis_points(
                &fees.total_fee_usd,
                &first.usd_in_after_fees,
            )));
        }
    }
    output
}
