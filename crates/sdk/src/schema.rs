use std::{collections::HashSet, path::Path};

use num_traits::Signed;
use synthetics_model::{
    params::{GasLimitsConfig, MarketConfig},
    Address, BigInt, MarketInfo, MarketsSnapshot, Token,
};

/// Snapshot file.
///
/// The boundary format of market data. A file is validated as a whole before
/// any of it reaches the model.
#[serde_with::serde_as]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotFile {
    /// Chain id.
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Min collateral USD value of positions.
    #[serde(default)]
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub min_collateral_usd: Option<BigInt>,
    /// Tokens.
    pub tokens: Vec<Token>,
    /// Markets.
    #[serde(default)]
    pub markets: Vec<MarketInfo>,
    /// Gas limits.
    #[serde(default)]
    pub gas_limits: GasLimitsConfig,
    /// Gas price in native token units.
    #[serde(default)]
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub gas_price: Option<BigInt>,
}

/// Validated market data.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    /// Chain id.
    pub chain_id: Option<u64>,
    /// Markets snapshot.
    pub snapshot: MarketsSnapshot,
    /// Gas limits.
    pub gas_limits: GasLimitsConfig,
    /// Gas price.
    pub gas_price: Option<BigInt>,
}

impl SnapshotFile {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            crate::Error::invalid_snapshot(format!("failed to read `{}`: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Validate the file and build the snapshot.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSnapshot`](crate::Error::InvalidSnapshot) if a
    /// token is duplicated, a price is invalid, a market is duplicated or
    /// refers to an unknown token, or a factor is negative.
    pub fn validate(self) -> crate::Result<LoadedSnapshot> {
        let mut seen = HashSet::new();
        for token in self.tokens.iter() {
            if !seen.insert(&token.address) {
                return Err(crate::Error::invalid_snapshot(format!(
                    "duplicated token `{}`",
                    token.address
                )));
            }
            if let Some(prices) = token.prices() {
                if !prices.is_valid() {
                    return Err(crate::Error::invalid_snapshot(format!(
                        "invalid prices of token `{}`",
                        token.symbol
                    )));
                }
            }
        }

        for info in self.markets.iter() {
            validate_config(info.address(), &info.config)?;
        }

        if let Some(gas_price) = self.gas_price.as_ref().filter(|price| price.is_negative()) {
            return Err(crate::Error::invalid_snapshot(format!(
                "negative gas price {gas_price}"
            )));
        }

        let mut snapshot = MarketsSnapshot::default();
        if let Some(min_collateral_usd) = self.min_collateral_usd {
            snapshot = snapshot.with_min_collateral_usd(min_collateral_usd);
        }
        for token in self.tokens {
            snapshot.insert_token(token);
        }
        for info in self.markets {
            let market_token = info.address().clone();
            snapshot.insert_market(info).map_err(|err| {
                crate::Error::invalid_snapshot(format!("market `{market_token}`: {err}"))
            })?;
        }
        tracing::info!(
            tokens = snapshot.tokens().count(),
            markets = snapshot.markets().count(),
            "loaded markets snapshot"
        );

        Ok(LoadedSnapshot {
            chain_id: self.chain_id,
            snapshot,
            gas_limits: self.gas_limits,
            gas_price: self.gas_price,
        })
    }
}

fn validate_config(market: &Address, config: &MarketConfig) -> crate::Result<()> {
    let fees = &config.fees;
    let factors = [
        ("reserveFactorLong", &config.reserve_factor_long),
        ("reserveFactorShort", &config.reserve_factor_short),
        ("minCollateralFactor", &config.min_collateral_factor),
        ("positionFeeFactor", &fees.position_fee_factor),
        ("swapFeeFactor", &fees.swap_fee_factor),
        (
            "maxPositionImpactFactorPositive",
            &fees.max_position_impact_factor_positive,
        ),
        (
            "maxPositionImpactFactorForLiquidations",
            &fees.max_position_impact_factor_for_liquidations,
        ),
        ("swapImpact.exponent", fees.swap_impact.exponent()),
        ("swapImpact.positiveFactor", fees.swap_impact.positive_factor()),
        ("swapImpact.negativeFactor", fees.swap_impact.negative_factor()),
        ("positionImpact.exponent", fees.position_impact.exponent()),
        (
            "positionImpact.positiveFactor",
            fees.position_impact.positive_factor(),
        ),
        (
            "positionImpact.negativeFactor",
            fees.position_impact.negative_factor(),
        ),
        (
            "borrowingFactorPerSecondForLongs",
            &fees.borrowing_factor_per_second_for_longs,
        ),
        (
            "borrowingFactorPerSecondForShorts",
            &fees.borrowing_factor_per_second_for_shorts,
        ),
        ("fundingFactorPerSecond", &fees.funding_factor_per_second),
    ];
    for (name, factor) in factors {
        if factor.is_negative() {
            return Err(crate::Error::invalid_snapshot(format!(
                "market `{market}`: negative `{name}`"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use synthetics_model::{
        test::{address, eth, usdc},
        utils::usd,
    };

    use super::*;

    fn file(markets: &str) -> String {
        format!(
            r#"{{
                "chainId": 42161,
                "tokens": [
                    {{ "address": "{eth}", "symbol": "ETH", "decimals": 18, "prices": {{ "min": "1000000000000000000000000000000000", "max": "1000000000000000000000000000000000" }} }},
                    {{ "address": "{usdc}", "symbol": "USDC", "decimals": 6, "isStable": true }}
                ],
                "markets": {markets},
                "gasLimits": {{ "swapOrder": "1000000", "singleSwap": "500000" }},
                "gasPrice": "1000000000"
            }}"#,
            eth = eth(),
            usdc = usdc(),
        )
    }

    fn market(long: &Address, reserve_factor: &str) -> String {
        format!(
            r#"{{
                "marketTokenAddress": "{market}",
                "indexTokenAddress": "{eth}",
                "longTokenAddress": "{long}",
                "shortTokenAddress": "{usdc}",
                "config": {{ "reserveFactorLong": "{reserve_factor}" }}
            }}"#,
            market = address(10),
            eth = eth(),
            usdc = usdc(),
        )
    }

    #[test]
    fn load_snapshot() -> crate::Result<()> {
        let json = file(&format!("[{}]", market(&eth(), "800000000000000000000000000000")));
        let loaded = SnapshotFile::from_json(&json)?.validate()?;
        assert_eq!(loaded.chain_id, Some(42161));
        assert_eq!(loaded.snapshot.markets().count(), 1);
        assert_eq!(loaded.gas_limits.single_swap, BigInt::from(500_000));
        assert_eq!(*loaded.snapshot.min_collateral_usd(), usd(1));
        assert!(loaded.snapshot.token_price(&usdc()).is_none());
        Ok(())
    }

    #[test]
    fn reject_invalid_data() -> crate::Result<()> {
        let unknown_token = file(&format!("[{}]", market(&address(50), "0")));
        assert!(matches!(
            SnapshotFile::from_json(&unknown_token)?.validate(),
            Err(crate::Error::InvalidSnapshot(_))
        ));

        let negative = file(&format!("[{}]", market(&eth(), "-1")));
        assert!(matches!(
            SnapshotFile::from_json(&negative)?.validate(),
            Err(crate::Error::InvalidSnapshot(_))
        ));

        let duplicated = file(&format!(
            "[{}, {}]",
            market(&eth(), "0"),
            market(&eth(), "0")
        ));
        assert!(matches!(
            SnapshotFile::from_json(&duplicated)?.validate(),
            Err(crate::Error::InvalidSnapshot(_))
        ));

        assert!(matches!(
            SnapshotFile::from_json(r#"{ "tokens": [], "unknown": 1 }"#),
            Err(crate::Error::Json(_))
        ));
        Ok(())
    }
}
