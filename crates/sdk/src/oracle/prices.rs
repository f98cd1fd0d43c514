use indexmap::IndexMap;
use synthetics_model::{
    constants::USD_DECIMALS,
    fixed::pow10,
    utils::{convert_from_contract_price, usd},
    Address, BigInt, Price, Token,
};

use super::Ticker;

/// Convert an oracle price of one whole `token` with `oracle_decimals`
/// decimals into a USD value per whole token.
///
/// The price is first cut to the precision of a price per unit of the token,
/// i.e. `USD_DECIMALS - token.decimals` decimals, so extra oracle digits are
/// truncated the same way they are for the contract prices.
pub fn parse_oracle_price(price: &BigInt, token: &Token, oracle_decimals: u8) -> BigInt {
    let unit_decimals = USD_DECIMALS.saturating_sub(token.decimals);
    let unit_price = if oracle_decimals <= unit_decimals {
        price * pow10(u32::from(unit_decimals - oracle_decimals))
    } else {
        price / pow10(u32::from(oracle_decimals - unit_decimals))
    };
    convert_from_contract_price(&unit_price, token.decimals)
}

/// Build the prices of the given tokens from oracle tickers.
///
/// Tickers of unknown tokens are skipped. Stable tokens without a ticker are
/// priced at `$1`, and the native token takes the price of the wrapped native
/// token when it has no ticker of its own.
pub fn prices_from_tickers<'a>(
    tokens: impl IntoIterator<Item = &'a Token>,
    tickers: &[Ticker],
) -> IndexMap<Address, Price> {
    let tokens = tokens
        .into_iter()
        .map(|token| (token.address.clone(), token))
        .collect::<IndexMap<_, _>>();

    let mut prices = IndexMap::with_capacity(tokens.len());
    for ticker in tickers {
        let Some((address, token)) = ticker
            .token_address
            .parse::<Address>()
            .ok()
            .and_then(|address| tokens.get(&address).map(|token| (address, *token)))
        else {
            tracing::debug!(
                token = %ticker.token_address,
                symbol = %ticker.token_symbol,
                "skipped unknown token"
            );
            continue;
        };
        let price = Price::new(
            parse_oracle_price(&ticker.min_price, token, ticker.oracle_decimals),
            parse_oracle_price(&ticker.max_price, token, ticker.oracle_decimals),
        );
        if !price.is_valid() {
            tracing::warn!(token = %address, ?price, "skipped invalid oracle price");
            continue;
        }
        prices.insert(address, price);
    }

    for token in tokens.values().filter(|token| token.is_stable) {
        prices
            .entry(token.address.clone())
            .or_insert_with(|| Price::exact(usd(1)));
    }

    let wrapped = tokens
        .values()
        .find(|token| token.is_wrapped)
        .and_then(|token| prices.get(&token.address).cloned());
    if let Some(wrapped) = wrapped {
        for token in tokens.values().filter(|token| token.is_native) {
            prices
                .entry(token.address.clone())
                .or_insert_with(|| wrapped.clone());
        }
    }

    prices
}

#[cfg(test)]
mod tests {
    use synthetics_model::{
        test::{self, address, dai, eth, usdc},
        utils::expand_decimals,
    };

    use super::*;

    fn ticker(token: &Address, min: u64, max: u64, decimals: u8) -> Ticker {
        Ticker {
            min_price: min.into(),
            max_price: max.into(),
            oracle_decimals: decimals,
            token_symbol: String::new(),
            token_address: token.to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn rescale_oracle_price() {
        let tokens = test::tokens();
        let btc = tokens.token(&test::btc()).unwrap();
        assert_eq!(
            parse_oracle_price(&BigInt::from(2_012_345_678_901u64), btc, 8),
            BigInt::from(2_012_345_678_901u64) * expand_decimals(1, 22)
        );
        let eth = tokens.token(&eth()).unwrap();
        assert_eq!(
            parse_oracle_price(&expand_decimals(3, 32), eth, 32),
            expand_decimals(3, 30)
        );
    }

    #[test]
    fn truncate_to_unit_price_precision() {
        let tokens = test::tokens();

        // An 18-decimal token keeps 12 decimals per whole token.
        let eth = tokens.token(&eth()).unwrap();
        assert_eq!(
            parse_oracle_price(&BigInt::from(309_195_000_000_000_099u64), eth, 14),
            usd(309_195) / 100
        );

        // A 6-decimal token keeps all of them.
        let usdc = tokens.token(&usdc()).unwrap();
        assert_eq!(
            parse_oracle_price(&BigInt::from(100_000_000_000_000_099u64), usdc, 17),
            usd(1) + BigInt::from(99) * expand_decimals(1, 13)
        );
    }

    #[test]
    fn build_prices() {
        let mut snapshot = test::tokens();
        let mut weth = snapshot.token(&eth()).cloned().unwrap();
        weth.is_wrapped = true;
        snapshot.insert_token(weth);
        let mut native = Token::new(address(100), "ETH", 18);
        native.is_native = true;
        snapshot.insert_token(native);

        let tickers = vec![
            ticker(&eth(), 100_000, 100_100, 2),
            ticker(&usdc(), 99, 101, 2),
            ticker(&address(50), 1, 1, 0),
            Ticker {
                token_address: "not an address".to_string(),
                ..ticker(&eth(), 1, 1, 0)
            },
        ];
        let prices = prices_from_tickers(snapshot.tokens(), &tickers);

        let eth_price = Price::new(usd(1_000), usd(1_001));
        assert_eq!(prices.get(&eth()), Some(&eth_price));
        assert_eq!(prices.get(&address(100)), Some(&eth_price));
        assert_eq!(
            prices.get(&usdc()).map(|price| price.min.clone()),
            Some(BigInt::from(99) * expand_decimals(1, 28))
        );
        assert_eq!(prices.get(&dai()), Some(&Price::exact(usd(1))));
        assert!(!prices.contains_key(&address(50)));
        assert!(!prices.contains_key(&test::btc()));
    }
}
