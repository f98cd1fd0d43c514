use num_bigint::BigInt;
use typed_builder::TypedBuilder;

use crate::utils;

/// Kind of an action that is charged an execution fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Swap order.
    Swap,
    /// Increase position order.
    Increase,
    /// Decrease position order.
    Decrease,
    /// Deposit.
    Deposit {
        /// Whether only one token is deposited.
        single_token: bool,
    },
    /// Withdrawal.
    Withdrawal {
        /// Whether only one token is withdrawn.
        single_token: bool,
    },
}

/// Gas limits of actions.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct GasLimitsConfig {
    /// Single token deposit.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub deposit_single_token: BigInt,
    /// Multi token deposit.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub deposit_multi_token: BigInt,
    /// Single token withdrawal.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub withdrawal_single_token: BigInt,
    /// Multi token withdrawal.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub withdrawal_multi_token: BigInt,
    /// Each swap step.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub single_swap: BigInt,
    /// Swap order.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub swap_order: BigInt,
    /// Increase order.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub increase_order: BigInt,
    /// Decrease order.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub decrease_order: BigInt,
    /// Base gas limit added to every estimation.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub estimated_fee_base_gas_limit: BigInt,
    /// Multiplier factor applied to the estimated gas limit.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub estimated_fee_multiplier_factor: BigInt,
}

impl GasLimitsConfig {
    /// Estimated gas limit of the action, before adjustment.
    pub fn gas_limit(&self, kind: ActionKind, swaps_count: usize) -> BigInt {
        let swaps = &self.single_swap * swaps_count;
        match kind {
            ActionKind::Swap => &self.swap_order + swaps,
            ActionKind::Increase => &self.increase_order + swaps,
            ActionKind::Decrease => &self.decrease_order + swaps,
            ActionKind::Deposit { single_token } => {
                if single_token {
                    self.deposit_single_token.clone()
                } else {
                    self.deposit_multi_token.clone()
                }
            }
            ActionKind::Withdrawal { single_token } => {
                if single_token {
                    self.withdrawal_single_token.clone()
                } else {
                    self.withdrawal_multi_token.clone()
                }
            }
        }
    }

    /// Gas limit after applying the base limit and the multiplier factor.
    pub fn adjusted_gas_limit(&self, estimated_gas_limit: &BigInt) -> BigInt {
        &self.estimated_fee_base_gas_limit
            + utils::apply_factor(estimated_gas_limit, &self.estimated_fee_multiplier_factor)
    }
}
