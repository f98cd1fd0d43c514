use std::cmp::Ordering;

use indexmap::IndexMap;
use num_traits::{Signed, Zero};
use synthetics_model::{Address, BigInt};

use super::{relative, AccountPositionsSummary};

/// Performance period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PerfPeriod {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last month.
    Month,
    /// All time.
    #[default]
    Total,
}

/// Closed-trade aggregates of an account over a period.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPerf {
    /// Account.
    pub account: Address,
    /// Period of the aggregates.
    #[serde(default)]
    pub period: PerfPeriod,
    /// Number of profitable closes.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub wins: u64,
    /// Number of losing closes.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub losses: u64,
    /// Trading volume.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub volume: BigInt,
    /// Realized PnL.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub total_pnl: BigInt,
    /// Largest collateral the account ever had in a position.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_collateral: BigInt,
    /// Cumulative collateral of increases.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub cumsum_collateral: BigInt,
    /// Cumulative size of increases.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub cumsum_size: BigInt,
    /// Sum of the max sizes of closed positions.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub sum_max_size: BigInt,
    /// Number of closed positions.
    #[serde(default)]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub closed_count: u64,
}

impl AccountPerf {
    /// Aggregates of an account without closed trades.
    pub fn empty(account: Address) -> Self {
        Self {
            account,
            period: PerfPeriod::default(),
            wins: 0,
            losses: 0,
            volume: BigInt::zero(),
            total_pnl: BigInt::zero(),
            max_collateral: BigInt::zero(),
            cumsum_collateral: BigInt::zero(),
            cumsum_size: BigInt::zero(),
            sum_max_size: BigInt::zero(),
            closed_count: 0,
        }
    }
}

/// Performance of an account including its open positions.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveAccountPerformance {
    /// Account.
    pub account: Address,
    /// Realized plus unrealized PnL, net of the fees of closing now.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub abs_profit: BigInt,
    /// Absolute profit over max collateral, in basis points.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub rel_profit: BigInt,
    /// Realized PnL.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub realized_pnl: BigInt,
    /// Unrealized PnL of open positions.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub unrealized_pnl: BigInt,
    /// Max collateral.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_collateral: BigInt,
    /// Average max size of closed and open positions.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub average_size: BigInt,
    /// Average leverage in basis points.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub average_leverage: BigInt,
    /// Wins.
    pub wins: u64,
    /// Losses.
    pub losses: u64,
}

impl LiveAccountPerformance {
    /// Combine closed-trade aggregates with the summary of open positions.
    pub fn new(perf: &AccountPerf, open: Option<&AccountPositionsSummary>) -> Self {
        let (unrealized_pnl, open_fees, open_max_size, open_count) = match open {
            Some(summary) => (
                summary.unrealized_pnl.clone(),
                summary.total_fees_usd(),
                summary.sum_max_size.clone(),
                summary.open_positions_count,
            ),
            None => (BigInt::zero(), BigInt::zero(), BigInt::zero(), 0),
        };

        let abs_profit = &perf.total_pnl + &unrealized_pnl - open_fees;
        let count = perf.closed_count + open_count;
        let average_size = if count == 0 {
            BigInt::zero()
        } else {
            (&perf.sum_max_size + open_max_size) / count
        };

        Self {
            account: perf.account.clone(),
            rel_profit: relative(&abs_profit, &perf.max_collateral),
            abs_profit,
            realized_pnl: perf.total_pnl.clone(),
            unrealized_pnl,
            max_collateral: perf.max_collateral.clone(),
            average_size,
            average_leverage: relative(&perf.cumsum_size, &perf.cumsum_collateral),
            wins: perf.wins,
            losses: perf.losses,
        }
    }

    /// Returns whether the account is in profit.
    pub fn is_profitable(&self) -> bool {
        self.abs_profit.is_positive()
    }

    fn cmp_by(&self, other: &Self, by: RankBy) -> Ordering {
        match by {
            RankBy::AbsProfit => self.abs_profit.cmp(&other.abs_profit),
            RankBy::RelProfit => self.rel_profit.cmp(&other.rel_profit),
            RankBy::AverageSize => self.average_size.cmp(&other.average_size),
            RankBy::AverageLeverage => self.average_leverage.cmp(&other.average_leverage),
            RankBy::Wins => self
                .wins
                .cmp(&other.wins)
                .then_with(|| other.losses.cmp(&self.losses)),
        }
    }
}

/// Ranking key. Rankings are always highest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[strum(serialize_all = "kebab-case")]
pub enum RankBy {
    /// Absolute profit.
    #[default]
    AbsProfit,
    /// Relative profit.
    RelProfit,
    /// Average size.
    AverageSize,
    /// Average leverage.
    AverageLeverage,
    /// Wins, then fewer losses.
    Wins,
}

/// A ranked item, `rank` starting from `1`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Ranked<T> {
    /// Rank.
    pub rank: usize,
    /// Item.
    #[serde(flatten)]
    pub item: T,
}

impl<T> Ranked<T> {
    pub(super) fn from_sorted(items: Vec<T>) -> Vec<Self> {
        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| Self {
                rank: idx + 1,
                item,
            })
            .collect()
    }
}

/// Rank accounts by live performance.
///
/// Accounts with open positions but no closed trades are included. Ties keep
/// the order of `perfs`, followed by the accounts only found in `open`.
pub fn rank_accounts<'a>(
    perfs: impl IntoIterator<Item = &'a AccountPerf>,
    open: &IndexMap<Address, AccountPositionsSummary>,
    by: RankBy,
) -> Vec<Ranked<LiveAccountPerformance>> {
    let mut performances = IndexMap::<Address, LiveAccountPerformance>::new();
    for perf in perfs {
        let performance = LiveAccountPerformance::new(perf, open.get(&perf.account));
        if performances
            .insert(perf.account.clone(), performance)
            .is_some()
        {
            tracing::warn!(
                account = %perf.account,
                "duplicated account performance, keeping the last one"
            );
        }
    }
    for (account, summary) in open {
        if !performances.contains_key(account) {
            let perf = AccountPerf::empty(account.clone());
            performances.insert(
                account.clone(),
                LiveAccountPerformance::new(&perf, Some(summary)),
            );
        }
    }

    let mut performances = performances.into_values().collect::<Vec<_>>();
    performances.sort_by(|a, b| b.cmp_by(a, by));
    Ranked::from_sorted(performances)
}

#[cfg(test)]
mod tests {
    use synthetics_model::{test, test::address, utils::usd};

    use super::*;
    use crate::leaderboard::{tests::record, OpenPosition};

    fn perf(account: u8, total_pnl: i64, max_collateral: u64) -> AccountPerf {
        AccountPerf {
            wins: 3,
            losses: 1,
            total_pnl: usd(total_pnl),
            max_collateral: usd(max_collateral),
            cumsum_collateral: usd(2_000),
            cumsum_size: usd(10_000),
            sum_max_size: usd(12_000),
            closed_count: 2,
            ..AccountPerf::empty(address(account))
        }
    }

    fn open_summaries() -> IndexMap<Address, AccountPositionsSummary> {
        let snapshot = test::snapshot();
        let positions = OpenPosition::from_records(
            &snapshot,
            &[record(100, true, 9_000, 10), record(103, true, 9_000, 10)],
        );
        AccountPositionsSummary::by_account(&positions)
    }

    #[test]
    fn live_performance() {
        let open = open_summaries();
        let summary = &open[&address(100)];
        let live = LiveAccountPerformance::new(&perf(100, 500, 1_000), Some(summary));
        assert_eq!(live.realized_pnl, usd(500));
        assert_eq!(live.unrealized_pnl, usd(1_000));
        // Fees: `3 + 2 + 4.5 - 1 = 8.5`.
        let abs_profit = usd(1_500) - usd(17) / 2;
        assert_eq!(live.abs_profit, abs_profit);
        assert_eq!(live.rel_profit, &abs_profit * 10_000 / usd(1_000));
        assert_eq!(live.average_size, usd(7_000));
        assert_eq!(live.average_leverage, BigInt::from(50_000));
        assert!(live.is_profitable());

        let closed_only = LiveAccountPerformance::new(&perf(101, -100, 0), None);
        assert_eq!(closed_only.abs_profit, -usd(100));
        assert_eq!(closed_only.rel_profit, BigInt::zero());
        assert_eq!(closed_only.average_size, usd(6_000));
    }

    #[test]
    fn rank_live_performances() {
        let open = open_summaries();
        let perfs = [perf(100, 500, 1_000), perf(101, 2_000, 10_000), perf(102, -50, 100)];

        let ranked = rank_accounts(&perfs, &open, RankBy::AbsProfit);
        let accounts = ranked
            .iter()
            .map(|ranked| ranked.item.account.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            accounts,
            [address(101), address(100), address(103), address(102)]
        );
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].rank, 4);

        let ranked = rank_accounts(&perfs, &open, RankBy::RelProfit);
        assert_eq!(ranked[0].item.account, address(100));
    }

    #[test]
    fn parse_rank_by() {
        assert_eq!("rel-profit".parse::<RankBy>().ok(), Some(RankBy::RelProfit));
        assert_eq!(RankBy::default().to_string(), "abs-profit");
        assert_eq!("week".parse::<PerfPeriod>().ok(), Some(PerfPeriod::Week));
    }
}
