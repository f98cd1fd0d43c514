/// Account performance and ranking.
pub mod performance;

use indexmap::IndexMap;
use num_traits::{Signed, Zero};
use synthetics_model::{
    constants::BASIS_POINTS_DIVISOR, utils, Address, BigInt, MarketsSnapshot, Position,
};

pub use self::performance::{
    rank_accounts, AccountPerf, LiveAccountPerformance, PerfPeriod, RankBy, Ranked,
};

/// An open position record as reported by the leaderboard indexer.
#[serde_with::serde_as]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPositionRecord {
    /// The position at the time of indexing.
    #[serde(flatten)]
    pub position: Position,
    /// Largest size the position ever had.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_size: BigInt,
    /// Realized PnL.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub realized_pnl: BigInt,
    /// Claimable funding fees in USD.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub claimable_funding_fees_usd: BigInt,
}

/// Live view of an open position.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    /// Owner.
    pub account: Address,
    /// Market token.
    pub market: Address,
    /// Collateral token.
    pub collateral_token: Address,
    /// Side.
    pub is_long: bool,
    /// Mark price of the index token.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub mark_price: BigInt,
    /// Entry price.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub entry_price: Option<BigInt>,
    /// Size valued at the current index price.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub size_in_usd: BigInt,
    /// Collateral amount.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub collateral_amount: BigInt,
    /// Collateral value.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub collateral_usd: BigInt,
    /// Largest size the position ever had.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_size: BigInt,
    /// Change of the size value since opening.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub unrealized_pnl: BigInt,
    /// PnL net of pending and closing fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub unrealized_pnl_after_fees: BigInt,
    /// Pending borrowing fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pending_borrowing_fees_usd: BigInt,
    /// Pending funding fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pending_funding_fees_usd: BigInt,
    /// Claimable funding fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pending_claimable_funding_fees_usd: BigInt,
    /// Position fee of closing the whole position.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub closing_fee_usd: BigInt,
    /// Liquidation price.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub liquidation_price: Option<BigInt>,
    /// Distance between the mark price and the liquidation price.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub liquidation_price_delta: Option<BigInt>,
    /// Liquidation price distance relative to the mark price, in basis points.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub liquidation_price_delta_rel: Option<BigInt>,
    /// Remaining collateral in collateral tokens after pending fees.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub remaining_collateral_amount: Option<BigInt>,
    /// PnL after fees relative to the collateral value plus the closing fee,
    /// in basis points.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pnl_after_fees_percentage: BigInt,
    /// Leverage in basis points.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub leverage: Option<BigInt>,
    /// Whether the leverage is above the max allowed leverage.
    pub has_low_collateral: bool,
}

impl OpenPosition {
    /// Value a position record with the prices of the snapshot.
    ///
    /// Returns `None` if the market, the tokens or their prices are missing.
    pub fn new(snapshot: &MarketsSnapshot, record: &OpenPositionRecord) -> Option<Self> {
        let position = &record.position;
        let info = snapshot.position_info(position)?;
        let market = snapshot.market(&position.market)?;
        let index_token = snapshot.token(&market.market.index_token)?;

        // Longs are valued at the min price and shorts at the max price.
        let price = index_token.prices()?.pick(!position.is_long);
        let size_in_usd = index_token.to_usd(&position.size_in_tokens, price);
        let unrealized_pnl = if position.is_long {
            &size_in_usd - &position.size_in_usd
        } else {
            &position.size_in_usd - &size_in_usd
        };

        let liquidation_price_delta = info
            .liquidation_price
            .as_ref()
            .map(|liquidation_price| (&info.mark_price - liquidation_price).abs());
        let liquidation_price_delta_rel = liquidation_price_delta
            .as_ref()
            .filter(|_| info.mark_price.is_positive())
            .map(|delta| utils::basis_points(delta, &info.mark_price));

        Some(Self {
            account: position.account.clone(),
            market: position.market.clone(),
            collateral_token: position.collateral_token.clone(),
            is_long: position.is_long,
            mark_price: info.mark_price,
            entry_price: info.entry_price,
            size_in_usd,
            collateral_amount: position.collateral_amount.clone(),
            collateral_usd: info.collateral_usd,
            max_size: record.max_size.clone(),
            unrealized_pnl,
            unrealized_pnl_after_fees: info.pnl_after_fees,
            pending_borrowing_fees_usd: position.pending_borrowing_fees_usd.clone(),
            pending_funding_fees_usd: position.pending_funding_fees_usd.clone(),
            pending_claimable_funding_fees_usd: record.claimable_funding_fees_usd.clone(),
            closing_fee_usd: info.closing_fee_usd,
            liquidation_price: info.liquidation_price,
            liquidation_price_delta,
            liquidation_price_delta_rel,
            remaining_collateral_amount: info.remaining_collateral_amount,
            pnl_after_fees_percentage: info.pnl_after_fees_percentage,
            leverage: info.leverage,
            has_low_collateral: info.has_low_collateral,
        })
    }

    /// Value all records, skipping the ones that cannot be valued.
    pub fn from_records<'a>(
        snapshot: &MarketsSnapshot,
        records: impl IntoIterator<Item = &'a OpenPositionRecord>,
    ) -> Vec<Self> {
        records
            .into_iter()
            .filter(|record| !record.position.is_empty())
            .filter_map(|record| {
                let position = Self::new(snapshot, record);
                if position.is_none() {
                    tracing::debug!(
                        account = %record.position.account,
                        market = %record.position.market,
                        "skipped position without market data"
                    );
                }
                position
            })
            .collect()
    }
}

/// Summary of the open positions of an account.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPositionsSummary {
    /// Account.
    pub account: Address,
    /// Sum of unrealized PnL.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub unrealized_pnl: BigInt,
    /// Sum of max sizes.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub sum_max_size: BigInt,
    /// Sum of pending funding fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pending_funding_fees_usd: BigInt,
    /// Sum of claimable funding fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pending_claimable_funding_fees_usd: BigInt,
    /// Sum of pending borrowing fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub pending_borrowing_fees_usd: BigInt,
    /// Sum of closing fees.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub closing_fee_usd: BigInt,
    /// Number of open positions.
    pub open_positions_count: u64,
}

impl AccountPositionsSummary {
    /// Create an empty summary.
    pub fn new(account: Address) -> Self {
        Self {
            account,
            unrealized_pnl: BigInt::zero(),
            sum_max_size: BigInt::zero(),
            pending_funding_fees_usd: BigInt::zero(),
            pending_claimable_funding_fees_usd: BigInt::zero(),
            pending_borrowing_fees_usd: BigInt::zero(),
            closing_fee_usd: BigInt::zero(),
            open_positions_count: 0,
        }
    }

    fn add(&mut self, position: &OpenPosition) {
        self.unrealized_pnl += &position.unrealized_pnl;
        self.sum_max_size += &position.max_size;
        self.pending_funding_fees_usd += &position.pending_funding_fees_usd;
        self.pending_claimable_funding_fees_usd += &position.pending_claimable_funding_fees_usd;
        self.pending_borrowing_fees_usd += &position.pending_borrowing_fees_usd;
        self.closing_fee_usd += &position.closing_fee_usd;
        self.open_positions_count += 1;
    }

    /// Fees that would be paid if all the positions were closed now.
    pub fn total_fees_usd(&self) -> BigInt {
        &self.pending_funding_fees_usd + &self.pending_borrowing_fees_usd + &self.closing_fee_usd
            - &self.pending_claimable_funding_fees_usd
    }

    /// Summarize open positions by account, in order of first appearance.
    pub fn by_account<'a>(
        positions: impl IntoIterator<Item = &'a OpenPosition>,
    ) -> IndexMap<Address, Self> {
        let mut summaries = IndexMap::<Address, Self>::new();
        for position in positions {
            summaries
                .entry(position.account.clone())
                .or_insert_with(|| Self::new(position.account.clone()))
                .add(position);
        }
        summaries
    }
}

/// Rank open positions by unrealized PnL after fees, highest first.
pub fn rank_positions(mut positions: Vec<OpenPosition>) -> Vec<Ranked<OpenPosition>> {
    positions.sort_by(|a, b| b.unrealized_pnl_after_fees.cmp(&a.unrealized_pnl_after_fees));
    Ranked::from_sorted(positions)
}

/// Relative value in basis points, zero if the base is not positive.
pub(crate) fn relative(value: &BigInt, base: &BigInt) -> BigInt {
    if base.is_positive() {
        value * BASIS_POINTS_DIVISOR / base
    } else {
        BigInt::zero()
    }
}

#[cfg(test)]
mod tests {
    use synthetics_model::{
        test::{self, address, amount, usdc},
        utils::usd,
    };

    use super::*;

    pub(super) fn record(account: u8, is_long: bool, size: u64, tokens: u64) -> OpenPositionRecord {
        OpenPositionRecord {
            position: Position {
                account: address(account),
                market: address(10),
                collateral_token: usdc(),
                is_long,
                size_in_usd: usd(size),
                size_in_tokens: amount(tokens, 18),
                collateral_amount: amount(1_000, 6),
                pending_borrowing_fees_usd: usd(3),
                pending_funding_fees_usd: usd(2),
                increased_at_block: 1,
                decreased_at_block: 0,
            },
            max_size: usd(size),
            realized_pnl: BigInt::zero(),
            claimable_funding_fees_usd: usd(1),
        }
    }

    #[test]
    fn value_open_positions() {
        let snapshot = test::snapshot();

        let long = OpenPosition::new(&snapshot, &record(100, true, 9_000, 10)).unwrap();
        assert_eq!(long.size_in_usd, usd(10_000));
        assert_eq!(long.unrealized_pnl, usd(1_000));
        assert_eq!(long.mark_price, usd(1_000));
        let liquidation_price = long.liquidation_price.clone().unwrap();
        assert!(liquidation_price < usd(1_000));
        assert_eq!(
            long.liquidation_price_delta,
            Some(usd(1_000) - &liquidation_price)
        );
        assert_eq!(
            long.liquidation_price_delta_rel,
            Some(utils::basis_points(&(usd(1_000) - &liquidation_price), &usd(1_000)))
        );

        let short = OpenPosition::new(&snapshot, &record(101, false, 9_000, 10)).unwrap();
        assert_eq!(short.unrealized_pnl, -usd(1_000));
        assert!(short.unrealized_pnl_after_fees < short.unrealized_pnl);

        // `990.5 / (1000 + 4.5)`.
        assert_eq!(long.pnl_after_fees_percentage, BigInt::from(9_860));
        assert_eq!(long.remaining_collateral_amount, Some(amount(995, 6)));
        assert!(!long.has_low_collateral);
    }

    #[test]
    fn flag_low_collateral() {
        let snapshot = test::snapshot();
        let mut low = record(100, true, 9_000, 10);
        low.position.collateral_amount = amount(50, 6);
        let low = OpenPosition::new(&snapshot, &low).unwrap();
        assert!(low.has_low_collateral);
        assert_eq!(low.remaining_collateral_amount, Some(amount(45, 6)));
    }

    #[test]
    fn skip_unknown_markets_and_empty_positions() {
        let snapshot = test::snapshot();
        let mut unknown = record(100, true, 9_000, 10);
        unknown.position.market = address(50);
        let mut empty = record(101, true, 0, 0);
        empty.position.size_in_usd = BigInt::zero();
        let valued = OpenPosition::from_records(
            &snapshot,
            &[unknown, empty, record(102, true, 9_000, 10)],
        );
        assert_eq!(valued.len(), 1);
        assert_eq!(valued[0].account, address(102));
    }

    #[test]
    fn summarize_by_account() {
        let snapshot = test::snapshot();
        let positions = OpenPosition::from_records(
            &snapshot,
            &[
                record(100, true, 9_000, 10),
                record(101, true, 9_000, 10),
                record(100, false, 9_000, 10),
            ],
        );
        let summaries = AccountPositionsSummary::by_account(&positions);
        assert_eq!(summaries.len(), 2);
        let summary = &summaries[&address(100)];
        assert_eq!(summary.open_positions_count, 2);
        assert_eq!(summary.unrealized_pnl, BigInt::zero());
        assert_eq!(summary.sum_max_size, usd(18_000));
        assert_eq!(summary.pending_borrowing_fees_usd, usd(6));
        assert_eq!(summary.pending_funding_fees_usd, usd(4));
        assert_eq!(summary.pending_claimable_funding_fees_usd, usd(2));
        // `2 * 9000 * 0.05% = 9`.
        assert_eq!(summary.closing_fee_usd, usd(9));
        assert_eq!(summary.total_fees_usd(), usd(17));
        assert_eq!(summaries.get_index(0).map(|(account, _)| account), Some(&address(100)));
    }

    #[test]
    fn rank_by_pnl_after_fees() {
        let snapshot = test::snapshot();
        let positions = OpenPosition::from_records(
            &snapshot,
            &[
                record(100, false, 9_000, 10),
                record(101, true, 9_000, 10),
                record(102, true, 9_500, 10),
            ],
        );
        let ranked = rank_positions(positions);
        let order = ranked
            .iter()
            .map(|ranked| (ranked.rank, ranked.item.account.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            [(1, address(101)), (2, address(102)), (3, address(100))]
        );
    }
}
