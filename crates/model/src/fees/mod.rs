use num_bigint::BigInt;

use crate::token::Address;

/// Price impact.
pub mod price_impact;

/// Swap fees.
pub mod swap;

/// Position order fees.
pub mod position;

/// Execution fee.
pub mod execution;

pub use self::{
    execution::ExecutionFee,
    position::{PositionOrderFees, PositionOrderParams},
    price_impact::price_impact_usd,
    swap::total_swap_fees,
};

/// Price impact in USD and its size relative to the trade.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PriceImpact {
    /// Signed impact in USD, positive for a rebate.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub impact_delta_usd: BigInt,
    /// Basis points of the impact relative to the trade size.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub basis_points: BigInt,
}

/// Fees of one swap step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SwapStepFees {
    /// Market the swap is routed through.
    pub market: Address,
    /// Input token.
    pub token_in: Address,
    /// Output token.
    pub token_out: Address,
    /// Swap fee amount in input token.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub swap_fee_amount: BigInt,
    /// Swap fee in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub swap_fee_usd: BigInt,
    /// Price impact in USD after applying the impact pool cap.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub capped_impact_delta_usd: BigInt,
    /// Total cost in USD, i.e. swap fee minus capped price impact.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub total_fee_usd: BigInt,
    /// Input amount after fees and negative impact.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub amount_in_after_fees: BigInt,
    /// USD value of the input after the swap fee.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub usd_in_after_fees: BigInt,
    /// Output amount.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub amount_out: BigInt,
}

/// Fees of a swap path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TotalSwapFees {
    /// Fees of each step.
    pub swaps: Vec<SwapStepFees>,
    /// Total price impact.
    pub total_price_impact: PriceImpact,
    /// Total swap fee in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub total_swap_fee_usd: BigInt,
    /// Total cost in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub total_fee_usd: BigInt,
    /// Input token.
    pub token_in: Address,
    /// Output token.
    pub token_out: Address,
    /// Output amount.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub amount_out: BigInt,
}
