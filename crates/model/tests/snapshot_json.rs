use synthetics_model::{
    test::{address, eth, usdc},
    utils::usd,
    Address, BigInt, MarketInfo, MarketsSnapshot, Price, Token,
};

const MARKET: &str = r#"{
    "marketTokenAddress": "0x000000000000000000000000000000000000000a",
    "indexTokenAddress": "0x0000000000000000000000000000000000000001",
    "longTokenAddress": "0x0000000000000000000000000000000000000001",
    "shortTokenAddress": "0x0000000000000000000000000000000000000002",
    "pools": {
        "longPoolAmount": "1000000000000000000000",
        "shortPoolAmount": "1000000000000"
    },
    "openInterest": {
        "longUsd": "0",
        "shortUsd": "0"
    },
    "config": {
        "fees": {
            "swapFeeFactor": "1000000000000000000000000000",
            "swapImpact": {
                "exponent": "1000000000000000000000000000000",
                "positiveFactor": "0",
                "negativeFactor": "0"
            }
        },
        "reserveFactorLong": "800000000000000000000000000000",
        "reserveFactorShort": "800000000000000000000000000000"
    }
}"#;

#[test]
fn market_info_from_json() -> synthetics_model::Result<()> {
    let info: MarketInfo = serde_json::from_str(MARKET).expect("must parse market info");
    assert_eq!(*info.address(), address(10));
    assert!(!info.market.is_spot_only);
    assert_eq!(info.config.fees.swap_fee_factor, BigInt::from(10).pow(27));

    let mut snapshot = MarketsSnapshot::default();
    snapshot.insert_token(Token::new(eth(), "ETH", 18).with_prices(Price::exact(usd(1_000))));
    snapshot.insert_token(Token::new(usdc(), "USDC", 6).with_prices(Price::exact(usd(1))));
    snapshot.insert_market(info)?;

    let fees = snapshot
        .swap_fees(&address(10), &eth(), &BigInt::from(10).pow(18))
        .expect("must be priceable");
    assert_eq!(fees.amount_out, BigInt::from(999_000_000));

    let json = serde_json::to_value(&fees).expect("must serialize");
    assert_eq!(json["amountOut"], "999000000");
    assert_eq!(json["tokenOut"], usdc().to_string());
    Ok(())
}

#[test]
fn addresses_are_normalized() {
    let address: Address = serde_json::from_str("\"0x000000000000000000000000000000000000000A\"")
        .expect("must parse address");
    assert_eq!(address.as_str(), "0x000000000000000000000000000000000000000a");
    assert!(serde_json::from_str::<Address>("\"0x12\"").is_err());
}
