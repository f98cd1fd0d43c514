use std::{sync::Arc, time::Duration};

use synthetics_model::{Address, BigInt, MarketsSnapshot};
use tokio::{sync::watch, task::JoinHandle};
use typed_builder::TypedBuilder;

use crate::market_graph::{MarketGraph, MarketGraphConfig};

use super::SwapRoute;

/// Config for [`RouteScheduler`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SchedulerConfig {
    /// Time to wait for further requests before computing.
    #[builder(default = Duration::from_millis(200))]
    pub debounce: Duration,
    /// Config of the market graphs built from snapshots.
    #[builder(default)]
    pub graph: MarketGraphConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Route request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    /// Token to swap from.
    pub from: Address,
    /// Token to swap to.
    pub to: Address,
    /// Amount of `from` to swap.
    pub amount_in: BigInt,
}

/// Result of the latest request.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    /// Generation of the request.
    pub generation: u64,
    /// The request.
    pub request: RouteRequest,
    /// The route, or the error of the route finder.
    pub route: Result<Option<SwapRoute>, Arc<crate::Error>>,
}

#[derive(Debug, Clone)]
struct Pending {
    generation: u64,
    request: RouteRequest,
}

/// Computes routes in a background task, keeping only the latest request.
///
/// A request supersedes every request submitted before it. Superseded
/// requests are never computed if they are replaced within the debounce
/// window, and their results are discarded otherwise. Publishing a new
/// snapshot recomputes the latest request.
///
/// Must be created inside a tokio runtime. The task is aborted on drop.
#[derive(Debug)]
pub struct RouteScheduler {
    requests: watch::Sender<Option<Pending>>,
    outcomes: watch::Receiver<Option<RouteOutcome>>,
    worker: JoinHandle<()>,
}

impl RouteScheduler {
    /// Spawn the scheduler task.
    ///
    /// The task stops once the snapshot sender is dropped.
    pub fn spawn(
        snapshots: watch::Receiver<Arc<MarketsSnapshot>>,
        config: SchedulerConfig,
    ) -> Self {
        let (requests, requests_rx) = watch::channel(None);
        let (outcomes_tx, outcomes) = watch::channel(None);
        let worker = tokio::spawn(Worker::new(config, snapshots).run(requests_rx, outcomes_tx));
        Self {
            requests,
            outcomes,
            worker,
        }
    }

    /// Submit a request, returning its generation.
    pub fn submit(&self, request: RouteRequest) -> u64 {
        let mut generation = 0;
        self.requests.send_modify(|pending| {
            generation = pending.as_ref().map(|p| p.generation + 1).unwrap_or(1);
            *pending = Some(Pending {
                generation,
                request,
            });
        });
        tracing::trace!(generation, "submitted route request");
        generation
    }

    /// Get the generation of the latest request.
    pub fn latest_generation(&self) -> Option<u64> {
        self.requests.borrow().as_ref().map(|p| p.generation)
    }

    /// Subscribe to the outcomes.
    pub fn subscribe(&self) -> watch::Receiver<Option<RouteOutcome>> {
        self.outcomes.clone()
    }

    /// Wait for the outcome of the latest request.
    ///
    /// # Errors
    /// Returns error if the scheduler task has stopped.
    pub async fn latest(&self) -> crate::Result<RouteOutcome> {
        let mut outcomes = self.subscribe();
        loop {
            if let Some(outcome) = outcomes.borrow_and_update().as_ref() {
                if Some(outcome.generation) == self.latest_generation() {
                    return Ok(outcome.clone());
                }
            }
            outcomes
                .changed()
                .await
                .map_err(|_| crate::Error::unknown("route scheduler stopped"))?;
        }
    }
}

impl Drop for RouteScheduler {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct Worker {
    config: SchedulerConfig,
    snapshots: watch::Receiver<Arc<MarketsSnapshot>>,
    current: Option<(Arc<MarketsSnapshot>, Arc<MarketGraph>)>,
}

impl Worker {
    fn new(config: SchedulerConfig, snapshots: watch::Receiver<Arc<MarketsSnapshot>>) -> Self {
        Self {
            config,
            snapshots,
            current: None,
        }
    }

    fn state(&mut self) -> (Arc<MarketsSnapshot>, Arc<MarketGraph>) {
        let snapshot = self.snapshots.borrow_and_update().clone();
        match &self.current {
            Some((current, graph)) if Arc::ptr_eq(current, &snapshot) => {
                (snapshot, graph.clone())
            }
            _ => {
                tracing::info!(markets = snapshot.markets().count(), "rebuilding market graph");
                let graph = Arc::new(MarketGraph::from_snapshot(&snapshot, self.config.graph));
                self.current = Some((snapshot.clone(), graph.clone()));
                (snapshot, graph)
            }
        }
    }

    async fn run(
        mut self,
        mut requests: watch::Receiver<Option<Pending>>,
        outcomes: watch::Sender<Option<RouteOutcome>>,
    ) {
        loop {
            tokio::select! {
                changed = requests.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            if !self.config.debounce.is_zero() {
                tokio::time::sleep(self.config.debounce).await;
            }

            let pending = requests.borrow_and_update().clone();
            let Some(pending) = pending else {
                continue;
            };
            let (snapshot, graph) = self.state();
            let request = pending.request.clone();
            let computed = tokio::task::spawn_blocking(move || {
                SwapRoute::find(
                    &snapshot,
                    &graph,
                    &request.from,
                    &request.to,
                    &request.amount_in,
                )
            })
            .await;
            let route = match computed {
                Ok(route) => route.map_err(Arc::new),
                Err(err) => Err(Arc::new(crate::Error::unknown(err))),
            };

            let latest = requests.borrow().as_ref().map(|p| p.generation);
            if latest != Some(pending.generation) {
                tracing::debug!(
                    generation = pending.generation,
                    ?latest,
                    "discarded superseded route"
                );
                continue;
            }
            tracing::debug!(generation = pending.generation, "publishing route");
            outcomes.send_replace(Some(RouteOutcome {
                generation: pending.generation,
                request: pending.request,
                route,
            }));
        }
        tracing::debug!("route scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use synthetics_model::test::{self, address, btc, dai, usdc};

    use super::*;
    use crate::utils::test::setup_fmt_tracing;

    fn request(from: Address, to: Address, units: u64, decimals: u8) -> RouteRequest {
        RouteRequest {
            from,
            to,
            amount_in: test::amount(units, decimals),
        }
    }

    #[tokio::test]
    async fn latest_request_wins() -> crate::Result<()> {
        let _tracing = setup_fmt_tracing("info");
        let (_snapshots, rx) = watch::channel(Arc::new(test::snapshot()));
        let config = SchedulerConfig::builder()
            .debounce(Duration::from_millis(50))
            .build();
        let scheduler = RouteScheduler::spawn(rx, config);

        scheduler.submit(request(usdc(), btc(), 1, 6));
        scheduler.submit(request(usdc(), btc(), 10, 6));
        let last = scheduler.submit(request(usdc(), dai(), 1_000, 6));
        assert_eq!(last, 3);

        let outcome = tokio::time::timeout(Duration::from_secs(5), scheduler.latest())
            .await
            .map_err(crate::Error::unknown)??;
        assert_eq!(outcome.generation, 3);
        assert_eq!(outcome.request.to, dai());
        let route = outcome.route.map_err(crate::Error::unknown)?;
        let route = route.expect("must have a route");
        assert_eq!(route.swap_path, vec![address(10), address(12)]);
        Ok(())
    }

    #[tokio::test]
    async fn new_snapshot_recomputes_latest_request() -> crate::Result<()> {
        let (snapshots, rx) = watch::channel(Arc::new(test::snapshot()));
        let config = SchedulerConfig::builder()
            .debounce(Duration::from_millis(10))
            .build();
        let scheduler = RouteScheduler::spawn(rx, config);
        let mut outcomes = scheduler.subscribe();

        scheduler.submit(request(usdc(), dai(), 1_000, 6));
        let first = tokio::time::timeout(Duration::from_secs(5), scheduler.latest())
            .await
            .map_err(crate::Error::unknown)??;
        assert!(matches!(first.route, Ok(Some(_))));
        outcomes.borrow_and_update();

        // Without markets there is no route.
        snapshots.send_replace(Arc::new(test::tokens()));
        tokio::time::timeout(Duration::from_secs(5), outcomes.changed())
            .await
            .map_err(crate::Error::unknown)?
            .map_err(crate::Error::unknown)?;
        let second = outcomes.borrow().clone().expect("must have an outcome");
        assert_eq!(second.generation, 1);
        assert!(matches!(second.route, Ok(None)));
        Ok(())
    }
}
