use num_traits::Signed;
use synthetics_model::{Address, BigInt, Token};
use typed_builder::TypedBuilder;

/// Trade type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TradeType {
    /// Long.
    Long,
    /// Short.
    Short,
    /// Swap.
    Swap,
}

/// Trade mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TradeMode {
    /// Market.
    #[default]
    Market,
    /// Limit.
    Limit,
    /// Trigger.
    Trigger,
}

/// Reason a trade cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Size is missing.
    #[error("Enter a size")]
    EnterSize,
    /// Trigger price is missing.
    #[error("Enter a trigger price")]
    EnterTriggerPrice,
    /// Token data is not loaded.
    #[error("Loading...")]
    Loading,
    /// Token to receive is not selected.
    #[error("Select a token")]
    SelectToken,
    /// Not enough balance.
    #[error("Insufficient {0} balance")]
    InsufficientBalance(String),
    /// Amount is missing.
    #[error("Enter an amount")]
    EnterAmount,
    /// No swap path found.
    #[error("Couldn't find a swap path")]
    NoSwapPath,
    /// Not enough liquidity.
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,
    /// High price impact is not accepted.
    #[error("Need to accept price impact")]
    AcceptPriceImpact,
    /// Swapping a token into itself.
    #[error("Select different tokens")]
    SelectDifferentTokens,
    /// Trigger ratio is missing.
    #[error("Enter a swap trigger ratio")]
    EnterTriggerRatio,
    /// Trigger price of a long limit order is above the mark price.
    #[error("Trigger price must be lower than mark price")]
    TriggerPriceAboveMark,
    /// Trigger price of a short limit order is below the mark price.
    #[error("Trigger price must be higher than mark price")]
    TriggerPriceBelowMark,
    /// Leverage is too high.
    #[error("Max leverage: {0}x")]
    MaxLeverage(String),
    /// Collateral is too small.
    #[error("Min collateral: {0} USD")]
    MinCollateral(String),
}

/// Params for [`submit_error`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SubmitParams<'a> {
    /// Trade type.
    pub trade_type: TradeType,
    /// Trade mode.
    #[builder(default)]
    pub mode: TradeMode,
    /// Token to pay, `None` if not loaded.
    #[builder(default, setter(strip_option))]
    pub from_token: Option<&'a Token>,
    /// Balance of the token to pay.
    #[builder(default, setter(strip_option))]
    pub from_balance: Option<BigInt>,
    /// Amount to pay.
    #[builder(default, setter(strip_option))]
    pub from_amount: Option<BigInt>,
    /// Token to receive or the collateral token.
    #[builder(default, setter(strip_option))]
    pub to_token: Option<&'a Address>,
    /// Swap path, `None` if no path is found.
    #[builder(default, setter(strip_option))]
    pub swap_path: Option<&'a [Address]>,
    /// Whether the markets have enough liquidity for the trade.
    #[builder(default = true)]
    pub has_liquidity: bool,
    /// Whether the price impact is high.
    #[builder(default)]
    pub is_high_price_impact: bool,
    /// Whether the high price impact is accepted.
    #[builder(default)]
    pub is_high_price_impact_accepted: bool,
    /// Mark price.
    #[builder(default, setter(strip_option))]
    pub mark_price: Option<BigInt>,
    /// Trigger price.
    #[builder(default, setter(strip_option))]
    pub trigger_price: Option<BigInt>,
    /// Trigger ratio of a limit swap.
    #[builder(default, setter(strip_option))]
    pub swap_trigger_ratio: Option<BigInt>,
    /// Size to close of a trigger order.
    #[builder(default, setter(strip_option))]
    pub close_size_usd: Option<BigInt>,
    /// Next leverage in basis points.
    #[builder(default, setter(strip_option))]
    pub leverage: Option<BigInt>,
    /// Max leverage in basis points.
    #[builder(default, setter(strip_option))]
    pub max_leverage: Option<BigInt>,
    /// Next collateral in USD.
    #[builder(default, setter(strip_option))]
    pub collateral_usd: Option<BigInt>,
    /// Min collateral in USD.
    #[builder(default, setter(strip_option))]
    pub min_collateral_usd: Option<BigInt>,
}

fn is_positive(value: &Option<BigInt>) -> bool {
    value.as_ref().is_some_and(|value| value.is_positive())
}

/// Get the first failing check of a trade, `None` if the trade can be submitted.
pub fn submit_error(params: &SubmitParams<'_>) -> Option<SubmitError> {
    if params.mode == TradeMode::Trigger {
        if !is_positive(&params.close_size_usd) {
            return Some(SubmitError::EnterSize);
        }
        if !is_positive(&params.trigger_price) {
            return Some(SubmitError::EnterTriggerPrice);
        }
        return None;
    }

    let Some(from_token) = params.from_token else {
        return Some(SubmitError::Loading);
    };
    let Some(to_token) = params.to_token else {
        return Some(SubmitError::SelectToken);
    };

    let zero = BigInt::default();
    if let Some(amount) = params.from_amount.as_ref() {
        if *amount > *params.from_balance.as_ref().unwrap_or(&zero) {
            return Some(SubmitError::InsufficientBalance(from_token.symbol.clone()));
        }
    }

    if !is_positive(&params.from_amount) {
        return Some(SubmitError::EnterAmount);
    }

    if params.swap_path.is_none() {
        return Some(SubmitError::NoSwapPath);
    }

    if !params.has_liquidity {
        return Some(SubmitError::InsufficientLiquidity);
    }

    if params.is_high_price_impact && !params.is_high_price_impact_accepted {
        return Some(SubmitError::AcceptPriceImpact);
    }

    match params.trade_type {
        TradeType::Swap => {
            if from_token.address == *to_token {
                return Some(SubmitError::SelectDifferentTokens);
            }
            if params.mode == TradeMode::Limit && !is_positive(&params.swap_trigger_ratio) {
                return Some(SubmitError::EnterTriggerRatio);
            }
        }
        TradeType::Long | TradeType::Short => {
            if params.mode == TradeMode::Limit {
                let is_long = params.trade_type == TradeType::Long;
                let wrong_side = match (params.trigger_price.as_ref(), params.mark_price.as_ref()) {
                    (Some(trigger), Some(mark)) => {
                        if is_long {
                            trigger > mark
                        } else {
                            trigger < mark
                        }
                    }
                    _ => true,
                };
                if wrong_side {
                    return Some(if is_long {
                        SubmitError::TriggerPriceAboveMark
                    } else {
                        SubmitError::TriggerPriceBelowMark
                    });
                }
            }
            if let (Some(leverage), Some(max)) =
                (params.leverage.as_ref(), params.max_leverage.as_ref())
            {
                if leverage > max {
                    return Some(SubmitError::MaxLeverage(format_basis_points(max)));
                }
            }
            if let (Some(collateral), Some(min)) = (
                params.collateral_usd.as_ref(),
                params.min_collateral_usd.as_ref(),
            ) {
                if collateral < min {
                    return Some(SubmitError::MinCollateral(format_usd(min)));
                }
            }
        }
    }

    None
}

fn format_basis_points(value: &BigInt) -> String {
    crate::utils::value_to_decimal(&(value * synthetics_model::utils::precision() / 10_000))
        .map(|value| value.normalize().to_string())
        .unwrap_or_else(|| value.to_string())
}

fn format_usd(value: &BigInt) -> String {
    crate::utils::value_to_decimal(value)
        .map(|value| value.round_dp(2).normalize().to_string())
        .unwrap_or_else(|| value.to_string())
}
