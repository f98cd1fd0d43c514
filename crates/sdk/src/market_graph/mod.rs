use std::fmt;

use indexmap::{map::Entry, IndexMap};
use num_traits::Zero;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    prelude::StableDiGraph,
    visit::{EdgeRef, NodeIndexable},
    Direction,
};
use synthetics_model::{Address, BigInt, Market, MarketsSnapshot};

/// Error type.
pub mod error;

/// Config.
pub mod config;

/// Swap estimation.
pub mod estimation;

pub use self::{
    config::MarketGraphConfig,
    error::MarketGraphError,
    estimation::{SnapshotEstimator, SwapEstimator},
};

type Graph = StableDiGraph<Address, Edge>;
type TokenIx = NodeIndex;

/// A directed swap step from one collateral token to the other through a market.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Market token.
    #[serde(rename = "marketAddress")]
    pub market_token: Address,
    /// Token in.
    pub from: Address,
    /// Token out.
    pub to: Address,
}

impl Edge {
    fn new(market_token: Address, from: Address, to: Address) -> Self {
        Self {
            market_token,
            from,
            to,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.market_token, self.to)
    }
}

struct MarketState {
    long_edge: EdgeIndex,
    short_edge: EdgeIndex,
}

type UsdOuts = Vec<Option<BigInt>>;
type Predecessors = Vec<Option<EdgeIndex>>;

/// Market Graph.
///
/// Collateral tokens are the nodes, and each market with distinct long and
/// short tokens contributes one edge in each direction. Edges are visited in
/// insertion order.
#[derive(Default)]
pub struct MarketGraph {
    tokens: IndexMap<Address, TokenIx>,
    markets: IndexMap<Address, MarketState>,
    graph: Graph,
    config: MarketGraphConfig,
}

impl fmt::Debug for MarketGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketGraph")
            .field("tokens", &self.tokens.keys().collect::<Vec<_>>())
            .field("markets", &self.markets.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl MarketGraph {
    /// Create an empty graph with the given config.
    pub fn with_config(config: MarketGraphConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Build a graph from the markets of a snapshot.
    pub fn from_snapshot(snapshot: &MarketsSnapshot, config: MarketGraphConfig) -> Self {
        let mut graph = Self::with_config(config);
        for info in snapshot.markets() {
            graph.insert_market(&info.market);
        }
        graph
    }

    /// Insert a market.
    ///
    /// Return `true` if the market is newly inserted. Markets whose long token
    /// and short token are the same are skipped.
    pub fn insert_market(&mut self, market: &Market) -> bool {
        if market.is_single_token() {
            tracing::debug!(market = %market.market_token, "skipped single token market");
            return false;
        }
        let long_token_ix = self.insert_token(&market.long_token);
        let short_token_ix = self.insert_token(&market.short_token);
        match self.markets.entry(market.market_token.clone()) {
            Entry::Vacant(e) => {
                let long_edge = self.graph.add_edge(
                    long_token_ix,
                    short_token_ix,
                    Edge::new(
                        market.market_token.clone(),
                        market.long_token.clone(),
                        market.short_token.clone(),
                    ),
                );
                let short_edge = self.graph.add_edge(
                    short_token_ix,
                    long_token_ix,
                    Edge::new(
                        market.market_token.clone(),
                        market.short_token.clone(),
                        market.long_token.clone(),
                    ),
                );
                e.insert(MarketState {
                    long_edge,
                    short_edge,
                });
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    fn insert_token(&mut self, token: &Address) -> TokenIx {
        match self.tokens.entry(token.clone()) {
            Entry::Vacant(e) => *e.insert(self.graph.add_node(token.clone())),
            Entry::Occupied(e) => *e.get(),
        }
    }

    /// Get config.
    pub fn config(&self) -> &MarketGraphConfig {
        &self.config
    }

    /// Returns whether the token is a node of the graph.
    pub fn contains_token(&self, token: &Address) -> bool {
        self.tokens.contains_key(token)
    }

    /// Get all tokens in insertion order.
    pub fn tokens(&self) -> impl Iterator<Item = &Address> {
        self.tokens.keys()
    }

    /// Get all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph
            .edge_indices()
            .filter_map(|ix| self.graph.edge_weight(ix))
    }

    /// Get the edges of the given market, long to short first.
    pub fn market_edges(&self, market_token: &Address) -> Option<(&Edge, &Edge)> {
        let state = self.markets.get(market_token)?;
        Some((
            self.graph.edge_weight(state.long_edge)?,
            self.graph.edge_weight(state.short_edge)?,
        ))
    }

    /// Get the outgoing edges of a token.
    pub fn edges_from(&self, token: &Address) -> Vec<&Edge> {
        let Some(ix) = self.tokens.get(token) else {
            return vec![];
        };
        let mut edges = self
            .graph
            .edges_directed(*ix, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.weight()))
            .collect::<Vec<_>>();
        edges.sort_by_key(|(ix, _)| ix.index());
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    fn to_index(&self, ix: TokenIx) -> usize {
        self.graph.to_index(ix)
    }

    /// Value-maximizing Bellman-Ford.
    ///
    /// Relaxes every edge `|V|` times, keeping the largest USD output reaching
    /// each token. Only strictly greater outputs replace the current best, so
    /// on ties the earliest edge wins.
    fn bellman_ford<E>(
        &self,
        source: TokenIx,
        usd_in: &BigInt,
        estimator: &E,
    ) -> crate::Result<(UsdOuts, Predecessors)>
    where
        E: SwapEstimator + ?Sized,
    {
        let g = &self.graph;
        let mut usd_outs: UsdOuts = vec![None; g.node_bound()];
        let mut predecessors: Predecessors = vec![None; g.node_bound()];
        for ix in self.tokens.values() {
            usd_outs[self.to_index(*ix)] = Some(BigInt::zero());
        }
        usd_outs[self.to_index(source)] = Some(usd_in.clone());

        let relax = |usd_outs: &UsdOuts, edge_ix: EdgeIndex| -> Option<(usize, BigInt)> {
            let (i, j) = g.edge_endpoints(edge_ix)?;
            let edge = g.edge_weight(edge_ix)?;
            let current_in = usd_outs[self.to_index(i)].as_ref()?;
            let usd_out = estimator.estimate(edge, current_in);
            let j = self.to_index(j);
            let improves = usd_outs[j]
                .as_ref()
                .map(|current| usd_out > *current)
                .unwrap_or(true);
            improves.then_some((j, usd_out))
        };

        for round in 0..g.node_count() {
            let mut did_update = false;
            for edge_ix in g.edge_indices() {
                if let Some((j, usd_out)) = relax(&usd_outs, edge_ix) {
                    usd_outs[j] = Some(usd_out);
                    predecessors[j] = Some(edge_ix);
                    did_update = true;
                }
            }
            if !did_update {
                tracing::trace!(round, "relaxation converged");
                break;
            }
        }

        // Check for cycles that keep increasing the output.
        for edge_ix in g.edge_indices() {
            if relax(&usd_outs, edge_ix).is_none() {
                continue;
            }
            if let Some(edge) = g.edge_weight(edge_ix) {
                return Err(MarketGraphError::NegativeCycle {
                    market: edge.market_token.clone(),
                }
                .into());
            }
        }

        Ok((usd_outs, predecessors))
    }

    /// Find the swap path from `from` to `to` that maximizes the USD output
    /// for an input of `usd_in`.
    ///
    /// Returns `Some(vec![])` if `from == to`, and `None` if either token is
    /// not in the graph or no path yields a positive output.
    ///
    /// # Errors
    /// Returns [`MarketGraphError::NegativeCycle`] if the estimations contain a
    /// cycle that keeps increasing the output, which means the market data is invalid.
    pub fn find_best_swap_path<E>(
        &self,
        from: &Address,
        to: &Address,
        usd_in: &BigInt,
        estimator: &E,
    ) -> crate::Result<Option<Vec<Edge>>>
    where
        E: SwapEstimator + ?Sized,
    {
        if from == to {
            return Ok(Some(vec![]));
        }
        let (Some(source), Some(target)) = (self.tokens.get(from), self.tokens.get(to)) else {
            return Ok(None);
        };

        let (usd_outs, predecessors) = self.bellman_ford(*source, usd_in, estimator)?;

        let mut path = vec![];
        let mut current = predecessors[self.to_index(*target)];
        while let Some(edge_ix) = current {
            if path.len() >= self.graph.node_count() {
                tracing::debug!(%from, %to, "predecessor chain does not reach the source");
                return Ok(None);
            }
            let Some(edge) = self.graph.edge_weight(edge_ix) else {
                break;
            };
            path.push(edge.clone());
            if edge.from == *from {
                break;
            }
            current = self
                .tokens
                .get(&edge.from)
                .and_then(|ix| predecessors[self.to_index(*ix)]);
        }
        path.reverse();

        if path.is_empty() || path.first().map(|edge| &edge.from) != Some(from) {
            return Ok(None);
        }
        if !self.config.accepts(path.len()) {
            tracing::debug!(steps = path.len(), "best path exceeds max steps");
            return Ok(None);
        }
        tracing::debug!(
            %from,
            %to,
            steps = path.len(),
            usd_out = ?usd_outs[self.to_index(*target)],
            "found best swap path"
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use synthetics_model::test::{self, address, btc, dai, eth, usdc};

    use super::*;
    use crate::utils::test::setup_fmt_tracing;

    fn usd(units: u64) -> BigInt {
        synthetics_model::utils::usd(units)
    }

    fn market(n: u8, long: Address, short: Address) -> Market {
        Market::new(address(n), long.clone(), long, short)
    }

    /// Constant fee of `bps` on every edge, except the ones in `blocked`.
    fn fee_estimator(bps: u64, blocked: Vec<Address>) -> impl Fn(&Edge, &BigInt) -> BigInt {
        move |edge: &Edge, usd_in: &BigInt| {
            if blocked.contains(&edge.market_token) {
                return BigInt::zero();
            }
            usd_in * (10_000 - bps) / 10_000
        }
    }

    #[test]
    fn graph_edges() {
        let mut graph = MarketGraph::default();
        assert!(graph.insert_market(&market(10, eth(), usdc())));
        assert!(!graph.insert_market(&market(10, eth(), usdc())));
        assert!(!graph.insert_market(&market(11, btc(), btc())));
        assert!(graph.insert_market(&market(12, btc(), usdc())));

        let edges = graph.edges().cloned().collect::<Vec<_>>();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0], Edge::new(address(10), eth(), usdc()));
        assert_eq!(edges[1], Edge::new(address(10), usdc(), eth()));
        assert_eq!(edges[2], Edge::new(address(12), btc(), usdc()));
        assert_eq!(graph.edges_from(&usdc()).len(), 2);
        assert!(!graph.contains_token(&dai()));
        assert!(graph.market_edges(&address(11)).is_none());
    }

    #[test]
    fn trivial_and_unknown_paths() -> crate::Result<()> {
        let mut graph = MarketGraph::default();
        graph.insert_market(&market(10, eth(), usdc()));
        let estimator = fee_estimator(10, vec![]);

        for token in [eth(), usdc(), dai()] {
            let path = graph.find_best_swap_path(&token, &token, &usd(1_000), &estimator)?;
            assert_eq!(path, Some(vec![]));
        }
        assert!(graph
            .find_best_swap_path(&eth(), &dai(), &usd(1_000), &estimator)?
            .is_none());
        assert!(graph
            .find_best_swap_path(&dai(), &eth(), &usd(1_000), &estimator)?
            .is_none());
        Ok(())
    }

    #[test]
    fn prefers_higher_output() -> crate::Result<()> {
        let _tracing = setup_fmt_tracing("info");
        let mut graph = MarketGraph::default();
        // Direct ETH -> BTC and ETH -> USDC -> BTC.
        graph.insert_market(&market(10, eth(), btc()));
        graph.insert_market(&market(11, eth(), usdc()));
        graph.insert_market(&market(12, btc(), usdc()));

        let cheap_direct = graph
            .find_best_swap_path(&eth(), &btc(), &usd(1_000), &fee_estimator(10, vec![]))?
            .expect("must have a path");
        assert_eq!(cheap_direct, vec![Edge::new(address(10), eth(), btc())]);

        let blocked_direct = graph
            .find_best_swap_path(
                &eth(),
                &btc(),
                &usd(1_000),
                &fee_estimator(10, vec![address(10)]),
            )?
            .expect("must have a path");
        assert_eq!(
            blocked_direct,
            vec![
                Edge::new(address(11), eth(), usdc()),
                Edge::new(address(12), usdc(), btc()),
            ]
        );

        assert!(graph
            .find_best_swap_path(
                &eth(),
                &btc(),
                &usd(1_000),
                &fee_estimator(10, vec![address(10), address(12)]),
            )?
            .is_none());
        Ok(())
    }

    #[test]
    fn ties_keep_the_earliest_edge() -> crate::Result<()> {
        let mut graph = MarketGraph::default();
        graph.insert_market(&market(10, eth(), usdc()));
        graph.insert_market(&market(11, eth(), usdc()));
        let path = graph
            .find_best_swap_path(&usdc(), &eth(), &usd(100), &fee_estimator(10, vec![]))?
            .expect("must have a path");
        assert_eq!(path, vec![Edge::new(address(10), usdc(), eth())]);
        Ok(())
    }

    #[test]
    fn max_steps_limits_paths() -> crate::Result<()> {
        let config = MarketGraphConfig { max_steps: Some(1) };
        let mut graph = MarketGraph::with_config(config);
        graph.insert_market(&market(11, eth(), usdc()));
        graph.insert_market(&market(12, btc(), usdc()));
        assert!(graph
            .find_best_swap_path(&eth(), &btc(), &usd(100), &fee_estimator(10, vec![]))?
            .is_none());
        Ok(())
    }

    #[test]
    fn increasing_cycle_is_an_error() {
        let mut graph = MarketGraph::default();
        graph.insert_market(&market(10, eth(), usdc()));
        graph.insert_market(&market(11, usdc(), btc()));
        graph.insert_market(&market(12, btc(), eth()));
        let estimator = |_: &Edge, usd_in: &BigInt| usd_in * 101 / 100;
        let err = graph
            .find_best_swap_path(&eth(), &btc(), &usd(100), &estimator)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::MarketGraph(MarketGraphError::NegativeCycle { .. })
        ));
    }

    #[test]
    fn snapshot_estimator_routes_through_markets() -> crate::Result<()> {
        let snapshot = test::snapshot();
        let graph = MarketGraph::from_snapshot(&snapshot, Default::default());
        let estimator = SnapshotEstimator::new(&snapshot);
        let path = graph
            .find_best_swap_path(&dai(), &btc(), &usd(1_000), &estimator)?
            .expect("must have a path");
        let markets = path
            .iter()
            .map(|edge| edge.market_token.clone())
            .collect::<Vec<_>>();
        assert_eq!(markets, vec![address(12), address(10), address(11)]);
        Ok(())
    }
}
