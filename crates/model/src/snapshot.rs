use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::{
    constants::DEFAULT_MIN_COLLATERAL_USD_UNITS,
    price::Price,
    token::{Address, Token},
    utils, MarketInfo,
};

/// Snapshot of markets, pools, open interest, token prices and configs.
///
/// A snapshot is never mutated in place once it is in use. Refreshing data
/// produces a new snapshot that replaces the old one.
#[derive(Debug, Clone)]
pub struct MarketsSnapshot {
    tokens: IndexMap<Address, Token>,
    markets: IndexMap<Address, MarketInfo>,
    min_collateral_usd: BigInt,
}

impl Default for MarketsSnapshot {
    fn default() -> Self {
        Self {
            tokens: Default::default(),
            markets: Default::default(),
            min_collateral_usd: utils::usd(DEFAULT_MIN_COLLATERAL_USD_UNITS),
        }
    }
}

impl MarketsSnapshot {
    /// Set the min collateral USD value of positions.
    pub fn with_min_collateral_usd(mut self, min_collateral_usd: BigInt) -> Self {
        self.min_collateral_usd = min_collateral_usd;
        self
    }

    /// Insert or replace a token.
    pub fn insert_token(&mut self, token: Token) -> Option<Token> {
        self.tokens.insert(token.address.clone(), token)
    }

    /// Insert a market.
    ///
    /// # Errors
    /// Returns error if the market exists or refers to unknown tokens.
    pub fn insert_market(&mut self, info: MarketInfo) -> crate::Result<()> {
        let market = &info.market;
        if self.markets.contains_key(&market.market_token) {
            return Err(crate::Error::DuplicatedMarket(market.market_token.clone()));
        }
        let required = [&market.long_token, &market.short_token]
            .into_iter()
            .chain((!market.is_spot_only).then_some(&market.index_token));
        for token in required {
            if !self.tokens.contains_key(token) {
                return Err(crate::Error::TokenNotFound(token.clone()));
            }
        }
        self.markets.insert(market.market_token.clone(), info);
        Ok(())
    }

    /// Create a new snapshot with the given prices applied.
    ///
    /// Tokens missing from `prices` keep their current prices.
    pub fn with_prices<'a>(
        &self,
        prices: impl IntoIterator<Item = (&'a Address, &'a Price)>,
    ) -> Self {
        let mut next = self.clone();
        for (address, price) in prices {
            if let Some(token) = next.tokens.get_mut(address) {
                token.prices = Some(price.clone());
            }
        }
        next
    }

    /// Get token.
    pub fn token(&self, address: &Address) -> Option<&Token> {
        self.tokens.get(address)
    }

    /// Get token prices.
    pub fn token_price(&self, address: &Address) -> Option<&Price> {
        self.token(address)?.prices()
    }

    /// Get all tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    /// Get market.
    pub fn market(&self, market_token: &Address) -> Option<&MarketInfo> {
        self.markets.get(market_token)
    }

    /// Get market or return an error.
    pub fn try_market(&self, market_token: &Address) -> crate::Result<&MarketInfo> {
        self.market(market_token)
            .ok_or_else(|| crate::Error::MarketNotFound(market_token.clone()))
    }

    /// Get all markets in insertion order.
    pub fn markets(&self) -> impl Iterator<Item = &MarketInfo> {
        self.markets.values()
    }

    /// Min collateral USD value of positions.
    pub fn min_collateral_usd(&self) -> &BigInt {
        &self.min_collateral_usd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Market;

    fn address(n: u8) -> Address {
        format!("0x{n:040x}").parse().unwrap()
    }

    #[test]
    fn insert_market_validates_tokens() {
        let mut snapshot = MarketsSnapshot::default();
        snapshot.insert_token(Token::new(address(1), "ETH", 18));
        snapshot.insert_token(Token::new(address(2), "USDC", 6));
        let market = Market::new(address(10), address(1), address(1), address(2));
        snapshot.insert_market(MarketInfo::new(market.clone())).unwrap();
        assert!(matches!(
            snapshot.insert_market(MarketInfo::new(market)),
            Err(crate::Error::DuplicatedMarket(_))
        ));
        let market = Market::new(address(11), address(3), address(1), address(2));
        assert!(matches!(
            snapshot.insert_market(MarketInfo::new(market)),
            Err(crate::Error::TokenNotFound(_))
        ));
    }

    #[test]
    fn with_prices_creates_new_snapshot() {
        let mut snapshot = MarketsSnapshot::default();
        snapshot.insert_token(Token::new(address(1), "ETH", 18));
        let price = Price::exact(utils::usd(2_000));
        let next = snapshot.with_prices([(&address(1), &price)]);
        assert!(snapshot.token_price(&address(1)).is_none());
        assert_eq!(next.token_price(&address(1)), Some(&price));
    }
}
