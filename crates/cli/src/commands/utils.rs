use std::path::Path;

use eyre::OptionExt;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use synthetics_sdk::{
    model::{Address, BigInt, MarketInfo, MarketsSnapshot, Token},
    utils::{amount_to_decimal, value_to_decimal},
};

/// Find a token by address or by symbol, ignoring case.
pub(crate) fn find_token<'a>(
    snapshot: &'a MarketsSnapshot,
    token: &str,
) -> eyre::Result<&'a Token> {
    if let Ok(address) = token.parse::<Address>() {
        return snapshot
            .token(&address)
            .ok_or_else(|| eyre::eyre!("token `{address}` is not in the snapshot"));
    }
    let mut found = snapshot
        .tokens()
        .filter(|candidate| candidate.symbol.eq_ignore_ascii_case(token));
    let first = found
        .next()
        .ok_or_else(|| eyre::eyre!("unknown token `{token}`"))?;
    if found.next().is_some() {
        eyre::bail!("ambiguous token symbol `{token}`, use the address instead");
    }
    Ok(first)
}

/// Find a market by its market token address.
pub(crate) fn find_market<'a>(
    snapshot: &'a MarketsSnapshot,
    market: &str,
) -> eyre::Result<&'a MarketInfo> {
    let address = market.parse::<Address>()?;
    Ok(snapshot.try_market(&address)?)
}

/// Display name of a market, e.g. `ETH/USD [ETH-USDC]`.
pub(crate) fn market_name(snapshot: &MarketsSnapshot, info: &MarketInfo) -> String {
    let symbol = |address: &Address| symbol(snapshot, address);
    let market = &info.market;
    if market.is_spot_only {
        format!(
            "SWAP-ONLY [{}-{}]",
            symbol(&market.long_token),
            symbol(&market.short_token)
        )
    } else {
        format!(
            "{}/USD [{}-{}]",
            symbol(&market.index_token),
            symbol(&market.long_token),
            symbol(&market.short_token)
        )
    }
}

/// Convert a decimal amount of `token` into its fixed-point amount.
pub(crate) fn parse_amount(token: &Token, amount: Decimal) -> eyre::Result<BigInt> {
    Ok(synthetics_sdk::utils::decimal_to_amount(amount, token.decimals)?)
}

/// Format a fixed-point amount.
pub(crate) fn format_amount(amount: &BigInt, decimals: u8) -> String {
    amount_to_decimal(amount, decimals)
        .map(|amount| amount.normalize().to_string())
        .unwrap_or_else(|| amount.to_string())
}

/// Format a USD value.
pub(crate) fn format_usd(value: &BigInt) -> String {
    value_to_decimal(value)
        .map(|value| value.round_dp(4).normalize().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Format basis points as a percentage.
pub(crate) fn format_bps(bps: &BigInt) -> String {
    match amount_to_decimal(bps, 2) {
        Some(percent) => format!("{}%", percent.round_dp(2).normalize()),
        None => format!("{bps} bps"),
    }
}

/// Read a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> eyre::Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|err| eyre::eyre!("failed to read `{}`: {err}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

/// Symbol of a token, or its address if unknown.
pub(crate) fn symbol(snapshot: &MarketsSnapshot, address: &Address) -> String {
    snapshot
        .token(address)
        .map(|token| token.symbol.clone())
        .unwrap_or_else(|| address.to_string())
}

/// Decimals of a token.
pub(crate) fn decimals(snapshot: &MarketsSnapshot, address: &Address) -> eyre::Result<u8> {
    Ok(snapshot
        .token(address)
        .ok_or_eyre("token not found")?
        .decimals)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use synthetics_model::{test, utils::usd};

    use super::*;

    #[test]
    fn find_tokens() -> eyre::Result<()> {
        let snapshot = test::snapshot();
        assert_eq!(find_token(&snapshot, "eth")?.address, test::eth());
        assert_eq!(
            find_token(&snapshot, &test::usdc().to_string())?.symbol,
            "USDC"
        );
        assert!(find_token(&snapshot, "DOGE").is_err());
        assert!(find_market(&snapshot, &test::address(10).to_string()).is_ok());
        assert!(find_market(&snapshot, &test::address(50).to_string()).is_err());
        Ok(())
    }

    #[test]
    fn names_and_formats() -> eyre::Result<()> {
        let snapshot = test::snapshot();
        let info = find_market(&snapshot, &test::address(10).to_string())?;
        assert_eq!(market_name(&snapshot, info), "ETH/USD [ETH-USDC]");
        assert_eq!(format_usd(&(usd(1_500) / 1_000)), "1.5");
        assert_eq!(format_bps(&BigInt::from(25)), "0.25%");
        assert_eq!(format_amount(&BigInt::from(1_230_000), 6), "1.23");
        let usdc = find_token(&snapshot, "USDC")?;
        assert_eq!(
            parse_amount(usdc, Decimal::from_str("12.5")?)?,
            BigInt::from(12_500_000)
        );
        Ok(())
    }
}
