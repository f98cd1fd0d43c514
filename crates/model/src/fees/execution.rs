use num_bigint::BigInt;

use crate::{
    params::{ActionKind, GasLimitsConfig},
    snapshot::MarketsSnapshot,
    token::Address,
};

/// Estimated execution fee of an action, paid in the native token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExecutionFee {
    /// Adjusted gas limit.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub gas_limit: BigInt,
    /// Fee token.
    pub fee_token: Address,
    /// Fee amount in fee token.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub fee_amount: BigInt,
    /// Fee value in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub fee_usd: BigInt,
}

impl MarketsSnapshot {
    /// Estimate the execution fee of an action with `swaps_count` swap steps.
    ///
    /// `gas_price` is in the smallest unit of the native token. Returns `None`
    /// if the snapshot has no priced native token.
    pub fn execution_fee(
        &self,
        gas_limits: &GasLimitsConfig,
        gas_price: &BigInt,
        kind: ActionKind,
        swaps_count: usize,
    ) -> Option<ExecutionFee> {
        let native = self.tokens().find(|token| token.is_native)?;
        let gas_limit = gas_limits.adjusted_gas_limit(&gas_limits.gas_limit(kind, swaps_count));
        let fee_amount = &gas_limit * gas_price;
        let fee_usd = native.to_usd(&fee_amount, &native.prices()?.min);
        Some(ExecutionFee {
            gas_limit,
            fee_token: native.address.clone(),
            fee_amount,
            fee_usd,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{self, address, factor},
        utils::usd,
        Price, Token,
    };

    #[test]
    fn execution_fee_of_swap_order() {
        let mut snapshot = test::tokens();
        assert!(snapshot
            .execution_fee(&GasLimitsConfig::default(), &BigInt::from(1), ActionKind::Swap, 0)
            .is_none());

        let mut native = Token::new(address(20), "ETH", 18).with_prices(Price::exact(usd(2_000)));
        native.is_native = true;
        snapshot.insert_token(native);

        let gas_limits = GasLimitsConfig::builder()
            .swap_order(BigInt::from(1_000_000))
            .single_swap(BigInt::from(500_000))
            .estimated_fee_base_gas_limit(BigInt::from(500_000))
            .estimated_fee_multiplier_factor(factor(1, 0))
            .build();
        // 1 gwei.
        let gas_price = BigInt::from(1_000_000_000u64);
        let fee = snapshot
            .execution_fee(&gas_limits, &gas_price, ActionKind::Swap, 2)
            .unwrap();
        assert_eq!(fee.gas_limit, BigInt::from(2_500_000));
        assert_eq!(fee.fee_token, address(20));
        assert_eq!(fee.fee_amount, BigInt::from(2_500_000_000_000_000u64));
        // `0.0025 ETH * 2000 = 5`.
        assert_eq!(fee.fee_usd, usd(5));
    }
}
