use num_traits::{Signed, Zero};
use synthetics_model::{
    params::MarketConfig,
    pool::MarketPools,
    test::{self, address, amount, config_with_swap_fee, eth, linear_impact, usdc},
    utils::usd,
    BigInt, MarketsSnapshot,
};

fn market_with_impact(config: MarketConfig) -> synthetics_model::Result<MarketsSnapshot> {
    let mut snapshot = test::tokens();
    let info = test::market_info(
        address(10),
        eth(),
        (&eth(), 1_000, 18),
        (&usdc(), 1_000_000, 6),
        config,
    );
    snapshot.insert_market(info)?;
    Ok(snapshot)
}

#[test]
fn amount_out_is_never_negative() -> synthetics_model::Result<()> {
    let mut config = config_with_swap_fee(30);
    // A negative impact factor of `2` exceeds the output of the swap.
    config.fees.swap_impact = linear_impact(0, 20_000_000_000);
    let snapshot = market_with_impact(config)?;

    for units in [1, 100, 10_000, 100_000] {
        let fees = snapshot
            .swap_fees(&address(10), &usdc(), &amount(units, 6))
            .expect("must be priceable");
        assert!(!fees.amount_out.is_negative());
        assert!(!fees.amount_in_after_fees.is_negative());
        assert!(fees.capped_impact_delta_usd.is_negative());
    }

    let fees = snapshot
        .swap_fees(&address(10), &usdc(), &amount(10_000, 6))
        .expect("must be priceable");
    assert_eq!(fees.amount_out, BigInt::zero());
    Ok(())
}

#[test]
fn swap_fees_are_deterministic() -> synthetics_model::Result<()> {
    let snapshot = test::snapshot();
    let path = [address(10), address(11)];
    let first = snapshot.swap_path_fees(&path, &eth(), &amount(3, 18));
    let second = snapshot.swap_path_fees(&path, &eth(), &amount(3, 18));
    assert!(first.is_some());
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn rebalancing_swap_earns_rebate() -> synthetics_model::Result<()> {
    let mut config = config_with_swap_fee(0);
    config.fees.swap_impact = linear_impact(10_000, 20_000);
    let mut snapshot = test::tokens();
    let info = test::market_info(
        address(10),
        eth(),
        (&eth(), 1_000, 18),
        (&usdc(), 500_000, 6),
        config,
    )
    .with_pools(MarketPools {
        long_pool_amount: amount(1_000, 18),
        short_pool_amount: amount(500_000, 6),
        swap_impact_pool_amount_long: amount(1, 18),
        ..Default::default()
    });
    snapshot.insert_market(info)?;

    let fees = snapshot
        .swap_fees(&address(10), &usdc(), &amount(100_000, 6))
        .expect("must be priceable");
    // Diff goes from `500000` to `300000`.
    assert_eq!(fees.capped_impact_delta_usd, usd(200_000) / 1_000_000 / 2);
    assert!(fees.total_fee_usd.is_negative());
    assert!(fees.amount_out > amount(100, 18));
    Ok(())
}
