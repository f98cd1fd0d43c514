use num_traits::{Signed, Zero};
use synthetics_model::{
    constants::BASIS_POINTS_DIVISOR,
    fees::TotalSwapFees,
    utils::{expand_decimals, precision},
    Address, BigInt, MarketsSnapshot, Token,
};
use typed_builder::TypedBuilder;

use crate::market_graph::{Edge, MarketGraph, SnapshotEstimator};

/// Latest-wins route scheduler.
pub mod scheduler;

pub use self::scheduler::{RouteOutcome, RouteRequest, RouteScheduler, SchedulerConfig};

/// Best swap route between two tokens.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRoute {
    /// Token swapped from, after resolving the native token.
    pub token_in: Address,
    /// Token swapped to, after resolving the native token.
    pub token_out: Address,
    /// Markets to swap through, empty if no swap is needed.
    pub swap_path: Vec<Address>,
    /// Fees of the path, `None` for an empty path.
    pub swap_fees: Option<TotalSwapFees>,
    /// Input amount.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub amount_in: BigInt,
    /// Output amount.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub amount_out: BigInt,
    /// USD value of the input at the min price.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub usd_in: BigInt,
    /// USD value of the output at the max price.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub usd_out: BigInt,
}

impl SwapRoute {
    /// Find the best route for swapping `amount_in` of `from` into `to`.
    ///
    /// The native token is routed as the wrapped native token. Returns `None`
    /// if a token or its prices are missing, or no path is found.
    ///
    /// # Errors
    /// Returns error if the route finder detects an increasing cycle.
    pub fn find(
        snapshot: &MarketsSnapshot,
        graph: &MarketGraph,
        from: &Address,
        to: &Address,
        amount_in: &BigInt,
    ) -> crate::Result<Option<Self>> {
        let from = resolve_wrapped(snapshot, from);
        let to = resolve_wrapped(snapshot, to);
        let (Some(token_in), Some(token_out)) = (snapshot.token(&from), snapshot.token(&to)) else {
            return Ok(None);
        };
        let (Some(price_in), Some(price_out)) = (token_in.prices(), token_out.prices()) else {
            return Ok(None);
        };
        let usd_in = token_in.to_usd(amount_in, &price_in.min);

        let estimator = SnapshotEstimator::new(snapshot);
        let Some(edges) = graph.find_best_swap_path(&from, &to, &usd_in, &estimator)? else {
            return Ok(None);
        };
        let swap_path = edges
            .iter()
            .map(|edge: &Edge| edge.market_token.clone())
            .collect::<Vec<_>>();

        let (swap_fees, amount_out) = if swap_path.is_empty() {
            (None, amount_in.clone())
        } else {
            let Some(fees) = snapshot.swap_path_fees(&swap_path, &from, amount_in) else {
                return Ok(None);
            };
            let amount_out = fees.amount_out.clone();
            (Some(fees), amount_out)
        };
        let usd_out = token_out.to_usd(&amount_out, &price_out.max);

        Ok(Some(Self {
            token_in: from,
            token_out: to,
            swap_path,
            swap_fees,
            amount_in: amount_in.clone(),
            amount_out,
            usd_in,
            usd_out,
        }))
    }

    /// Total fee in USD of the route.
    pub fn total_fee_usd(&self) -> BigInt {
        self.swap_fees
            .as_ref()
            .map(|fees| fees.total_fee_usd.clone())
            .unwrap_or_default()
    }
}

/// Get the wrapped native token if `token` is the native token,
/// otherwise return `token` itself.
pub fn resolve_wrapped(snapshot: &MarketsSnapshot, token: &Address) -> Address {
    let is_native = snapshot
        .token(token)
        .map(|token| token.is_native)
        .unwrap_or(false);
    if is_native {
        if let Some(wrapped) = snapshot.tokens().find(|token| token.is_wrapped) {
            return wrapped.address.clone();
        }
    }
    token.clone()
}

/// Precision of trigger ratios.
pub fn trigger_ratio_precision() -> BigInt {
    precision()
}

/// Which token of a swap has the higher price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum BiggestSide {
    /// The token swapped from.
    From,
    /// The token swapped to.
    To,
}

/// Mark ratio between the prices of two tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRatio {
    /// Token with the higher price.
    pub biggest_side: BiggestSide,
    /// Price of the biggest side over the price of the other side,
    /// in [`trigger_ratio_precision`] units.
    pub ratio: BigInt,
}

/// Calculate the mark ratio of a swap.
///
/// Returns `None` if a price is not positive.
pub fn mark_ratio(from_price: &BigInt, to_price: &BigInt) -> Option<MarkRatio> {
    if !from_price.is_positive() || !to_price.is_positive() {
        return None;
    }
    let (biggest_side, numerator, denominator) = if from_price > to_price {
        (BiggestSide::From, from_price, to_price)
    } else {
        (BiggestSide::To, to_price, from_price)
    };
    Some(MarkRatio {
        biggest_side,
        ratio: numerator * trigger_ratio_precision() / denominator,
    })
}

/// Params for [`next_token_amount`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct NextTokenAmountParams<'a> {
    /// Token swapped from.
    pub from_token: &'a Token,
    /// Amount of the token swapped from.
    pub from_amount: BigInt,
    /// Price of the token swapped from.
    pub from_price: BigInt,
    /// Token swapped to.
    pub to_token: &'a Token,
    /// Price of the token swapped to.
    pub to_price: BigInt,
    /// Trigger price of a limit order.
    #[builder(default, setter(strip_option))]
    pub trigger_price: Option<BigInt>,
    /// Whether the trigger price is the price of the token swapped from.
    #[builder(default)]
    pub is_inverted_trigger_price: bool,
    /// Trigger ratio of a limit swap.
    #[builder(default, setter(strip_option))]
    pub swap_trigger_ratio: Option<BigInt>,
    /// Whether the trigger ratio is `to / from` instead of `from / to`.
    #[builder(default)]
    pub is_inverted_trigger_ratio: bool,
    /// Leverage in basis points.
    #[builder(default, setter(strip_option))]
    pub leverage: Option<BigInt>,
    /// Whether the leverage divides instead of multiplies.
    #[builder(default)]
    pub is_inverted_leverage: bool,
}

/// Calculate the amount of the counterpart token of a trade.
///
/// A positive trigger ratio takes precedence over a positive trigger price.
/// Returns `None` if a price is zero.
pub fn next_token_amount(params: &NextTokenAmountParams<'_>) -> Option<BigInt> {
    let from_usd = params
        .from_token
        .to_usd(&params.from_amount, &params.from_price);
    let mut to_amount = params.to_token.to_amount(&from_usd, &params.to_price)?;

    let positive = |value: &Option<BigInt>| value.as_ref().filter(|v| v.is_positive()).cloned();
    if let Some(ratio) = positive(&params.swap_trigger_ratio) {
        let precision = trigger_ratio_precision();
        let ratio = if params.is_inverted_trigger_ratio {
            &precision * &precision / ratio
        } else {
            ratio
        };
        let ratio = adjust_for_decimals(
            &ratio,
            params.from_token.decimals,
            params.to_token.decimals,
        );
        to_amount = &params.from_amount * ratio / precision;
    } else if let Some(trigger_price) = positive(&params.trigger_price) {
        to_amount = if params.is_inverted_trigger_price {
            let to_trigger_usd = params
                .from_token
                .to_usd(&params.from_amount, &trigger_price);
            params.to_token.to_amount(&to_trigger_usd, &params.to_price)?
        } else {
            params.to_token.to_amount(&from_usd, &trigger_price)?
        };
    }

    if let Some(leverage) = params.leverage.as_ref() {
        let divisor = BigInt::from(BASIS_POINTS_DIVISOR);
        let leverage = if params.is_inverted_leverage {
            if leverage.is_zero() {
                return None;
            }
            &divisor * &divisor / leverage
        } else {
            leverage.clone()
        };
        to_amount = to_amount * leverage / divisor;
    }

    Some(to_amount)
}

fn adjust_for_decimals(amount: &BigInt, div_decimals: u8, mul_decimals: u8) -> BigInt {
    amount * expand_decimals(1, mul_decimals) / expand_decimals(1, div_decimals)
}
