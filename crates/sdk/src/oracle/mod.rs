use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use indexmap::{IndexMap, IndexSet};
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use typed_builder::TypedBuilder;
use url::Url;

/// Ticker and candle types.
pub mod types;

/// Prices from tickers.
pub mod prices;

pub use self::{
    prices::{parse_oracle_price, prices_from_tickers},
    types::{Candle, Period, Ticker},
};

/// Path of the tickers endpoint.
pub const TICKERS_PATH: &str = "/prices/tickers";

/// Path of the candles endpoint.
pub const CANDLES_PATH: &str = "/prices/candles";

/// Default number of candles to fetch.
pub const DEFAULT_CANDLES_LIMIT: usize = 5000;

/// Arbitrum chain id.
pub const ARBITRUM: u64 = 42161;

/// Avalanche chain id.
pub const AVALANCHE: u64 = 43114;

/// Arbitrum Goerli chain id.
pub const ARBITRUM_GOERLI: u64 = 421613;

/// Avalanche Fuji chain id.
pub const AVALANCHE_FUJI: u64 = 43113;

/// Default oracle keeper mirrors of a chain.
pub fn default_urls(chain_id: u64) -> &'static [&'static str] {
    match chain_id {
        ARBITRUM => &[
            "https://arbitrum.gmx-oracle.io",
            "https://arbitrum-2.gmx-oracle.io",
        ],
        AVALANCHE => &[
            "https://avalanche.gmx-oracle.io",
            "https://avalanche-2.gmx-oracle.io",
        ],
        ARBITRUM_GOERLI => &["https://oracle-api-arb-goerli-xyguy.ondigitalocean.app"],
        _ => &["https://gmx-oracle-keeper-ro-avax-fuji-d4il9.ondigitalocean.app"],
    }
}

/// Oracle keeper config.
#[serde_with::serde_as]
#[derive(Debug, Clone, TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct OracleKeeperConfig {
    /// Chain id.
    #[builder(default = ARBITRUM)]
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Mirror URLs, the defaults of the chain are used if empty.
    #[builder(default)]
    #[serde(default)]
    pub urls: Vec<String>,
    /// Timeout of each request.
    #[builder(default = Duration::from_secs(2))]
    #[serde(default = "default_timeout")]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    /// Max number of attempts of a request.
    #[builder(default = 5)]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Delay before the first retry, doubled after each retry.
    #[builder(default = Duration::from_millis(200))]
    #[serde(default = "default_backoff")]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub backoff: Duration,
    /// Upper bound of the retry delay.
    #[builder(default = Duration::from_secs(5))]
    #[serde(default = "default_max_backoff")]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub max_backoff: Duration,
}

fn default_chain_id() -> u64 {
    ARBITRUM
}

fn default_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_max_attempts() -> usize {
    5
}

fn default_backoff() -> Duration {
    Duration::from_millis(200)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(5)
}

impl Default for OracleKeeperConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl OracleKeeperConfig {
    /// Config of another chain with the same request policy.
    pub fn for_chain(&self, chain_id: u64) -> Self {
        let mut config = self.clone();
        if config.chain_id != chain_id {
            config.chain_id = chain_id;
            config.urls.clear();
        }
        config
    }

    fn retry_delay(&self, attempt: usize) -> Duration {
        let shift = u32::try_from(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX)
            .min(16);
        self.backoff
            .saturating_mul(1 << shift)
            .min(self.max_backoff)
    }
}

#[derive(Debug)]
struct Mirrors {
    current: usize,
    banned: IndexSet<usize>,
}

/// Oracle keeper client.
///
/// Requests go to the current mirror. A mirror failing a request is banned
/// and the next one not banned is used. Once every mirror is banned, a random
/// one is picked.
#[derive(Debug)]
pub struct OracleKeeper {
    config: OracleKeeperConfig,
    urls: Vec<Url>,
    client: Client,
    mirrors: Mutex<Mirrors>,
}

impl OracleKeeper {
    /// Create a new oracle keeper client.
    pub fn try_new(config: OracleKeeperConfig) -> crate::Result<Self> {
        Self::try_new_with_rng(config, &mut rand::thread_rng())
    }

    /// Create a new oracle keeper client, choosing the first mirror with the given rng.
    pub fn try_new_with_rng(config: OracleKeeperConfig, rng: &mut impl Rng) -> crate::Result<Self> {
        let urls = if config.urls.is_empty() {
            default_urls(config.chain_id)
                .iter()
                .map(|url| url.parse())
                .collect::<Result<Vec<Url>, _>>()?
        } else {
            config
                .urls
                .iter()
                .map(|url| url.parse())
                .collect::<Result<Vec<Url>, _>>()?
        };
        if urls.is_empty() {
            return Err(crate::Error::unknown("no oracle keeper url"));
        }
        if config.max_attempts == 0 {
            return Err(crate::Error::unknown("`max_attempts` must be positive"));
        }
        let current = rng.gen_range(0, urls.len());
        tracing::debug!(url = %urls[current], chain_id = config.chain_id, "using oracle keeper");
        Ok(Self {
            config,
            urls,
            client: Client::new(),
            mirrors: Mutex::new(Mirrors {
                current,
                banned: IndexSet::default(),
            }),
        })
    }

    /// Get the config.
    pub fn config(&self) -> &OracleKeeperConfig {
        &self.config
    }

    /// Get the current mirror.
    pub fn current_url(&self) -> &Url {
        let current = self.lock_mirrors().current;
        &self.urls[current]
    }

    /// Get the banned mirrors.
    pub fn banned_urls(&self) -> Vec<&Url> {
        self.lock_mirrors()
            .banned
            .iter()
            .map(|idx| &self.urls[*idx])
            .collect()
    }

    fn lock_mirrors(&self) -> std::sync::MutexGuard<'_, Mirrors> {
        self.mirrors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fallback(&self) {
        let mut mirrors = self.lock_mirrors();
        let failed = mirrors.current;
        mirrors.banned.insert(failed);
        let next = (0..self.urls.len()).find(|idx| !mirrors.banned.contains(idx));
        mirrors.current = match next {
            Some(next) => next,
            None => rand::thread_rng().gen_range(0, self.urls.len()),
        };
        tracing::warn!(
            failed = %self.urls[failed],
            next = %self.urls[mirrors.current],
            "switched oracle keeper mirror"
        );
    }

    async fn request<T, Q>(
        &self,
        path: &str,
        query: Option<&Q>,
        validate: impl Fn(&T) -> bool,
    ) -> crate::Result<T>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let mut last_error = None;
        for attempt in 1..=self.config.max_attempts {
            let url = self.current_url().join(path)?;
            match self.try_request(url.clone(), query, &validate).await {
                Ok(data) => return Ok(data),
                Err(err) => {
                    tracing::warn!(%url, attempt, %err, "oracle keeper request failed");
                    last_error = Some(err);
                    self.fallback();
                }
            }
            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.retry_delay(attempt)).await;
            }
        }
        Err(crate::Error::transport(format!(
            "oracle keeper request `{path}` failed after {} attempts: {}",
            self.config.max_attempts,
            last_error
                .map(|err| err.to_string())
                .unwrap_or_default()
        )))
    }

    async fn try_request<T, Q>(
        &self,
        url: Url,
        query: Option<&Q>,
        validate: &impl Fn(&T) -> bool,
    ) -> crate::Result<T>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let mut request = self.client.get(url).timeout(self.config.timeout);
        if let Some(query) = query {
            request = request.query(query);
        }
        let data = request.send().await?.error_for_status()?.json::<T>().await?;
        if validate(&data) {
            Ok(data)
        } else {
            Err(crate::Error::transport("oracle keeper response validation failed"))
        }
    }

    /// Fetch the latest tickers.
    pub async fn tickers(&self) -> crate::Result<Vec<Ticker>> {
        self.request::<Vec<Ticker>, ()>(TICKERS_PATH, None, |tickers| !tickers.is_empty())
            .await
    }

    /// Fetch the latest candles of a token, oldest first.
    pub async fn candles(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> crate::Result<Vec<Candle>> {
        let query = [
            ("tokenSymbol", symbol.to_string()),
            ("period", period.to_string()),
            ("limit", limit.to_string()),
        ];
        let response = self
            .request::<types::CandlesResponse, _>(CANDLES_PATH, Some(&query), |data| {
                !data.candles.is_empty()
            })
            .await?;
        let mut candles = response
            .candles
            .into_iter()
            .map(Candle::from)
            .collect::<Vec<_>>();
        candles.sort_by_key(|candle| candle.time);
        Ok(candles)
    }
}

/// Oracle keeper clients by chain id.
///
/// Owned by the caller, clients are created on first use with the
/// request policy of the template config.
#[derive(Debug, Default)]
pub struct OracleKeepers {
    template: OracleKeeperConfig,
    keepers: IndexMap<u64, Arc<OracleKeeper>>,
}

impl OracleKeepers {
    /// Create a cache with the given template config.
    pub fn new(template: OracleKeeperConfig) -> Self {
        Self {
            template,
            keepers: Default::default(),
        }
    }

    /// Insert a client, replacing the existing one of the chain.
    pub fn insert(&mut self, keeper: OracleKeeper) -> Arc<OracleKeeper> {
        let keeper = Arc::new(keeper);
        self.keepers
            .insert(keeper.config().chain_id, keeper.clone());
        keeper
    }

    /// Get the client of the chain, creating it if absent.
    pub fn get_or_create(&mut self, chain_id: u64) -> crate::Result<Arc<OracleKeeper>> {
        if let Some(keeper) = self.keepers.get(&chain_id) {
            return Ok(keeper.clone());
        }
        let keeper = OracleKeeper::try_new(self.template.for_chain(chain_id))?;
        Ok(self.insert(keeper))
    }

    /// Get the client of the chain.
    pub fn get(&self, chain_id: u64) -> Option<&Arc<OracleKeeper>> {
        self.keepers.get(&chain_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::{rngs::StdRng, SeedableRng};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;
    use crate::utils::test::setup_fmt_tracing;

    const TICKERS: &str = r#"[{"minPrice":"100000","maxPrice":"100100","oracleDecimals":2,"tokenSymbol":"ETH","tokenAddress":"0x0000000000000000000000000000000000000001"}]"#;

    const CANDLES: &str = r#"{"candles":[[1700000300,2.0,3.0,1.0,2.5],[1700000000,1.0,2.0,0.5,2.0]]}"#;

    /// Serve canned responses, returning the base URL and the request counter.
    async fn serve(status: u16, body: &'static str) -> eyre::Result<(Url, Arc<AtomicUsize>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url: Url = format!("http://{}", listener.local_addr()?).parse()?;
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut read = 0;
                    while let Ok(n) = stream.read(&mut buf[read..]).await {
                        if n == 0 {
                            break;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                            break;
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        Ok((url, hits))
    }

    fn config(urls: Vec<Url>, max_attempts: usize) -> OracleKeeperConfig {
        OracleKeeperConfig::builder()
            .urls(urls.iter().map(|url| url.to_string()).collect())
            .max_attempts(max_attempts)
            .backoff(Duration::from_millis(1))
            .timeout(Duration::from_secs(2))
            .build()
    }

    #[tokio::test]
    async fn fetch_tickers() -> eyre::Result<()> {
        let _tracing = setup_fmt_tracing("info");
        let (url, hits) = serve(200, TICKERS).await?;
        let keeper = OracleKeeper::try_new(config(vec![url], 3))?;
        let tickers = keeper.tickers().await?;
        assert_eq!(tickers.len(), 1);
        assert_eq!(tickers[0].token_symbol, "ETH");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_candles() -> eyre::Result<()> {
        let (url, _) = serve(200, CANDLES).await?;
        let keeper = OracleKeeper::try_new(config(vec![url], 1))?;
        let candles = keeper
            .candles("ETH", Period::FiveMinutes, DEFAULT_CANDLES_LIMIT)
            .await?;
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_700_000_000);
        assert_eq!(candles[1].close, 2.5);
        Ok(())
    }

    #[tokio::test]
    async fn failover_to_another_mirror() -> eyre::Result<()> {
        let _tracing = setup_fmt_tracing("info");
        let (bad, bad_hits) = serve(500, "{}").await?;
        let (good, good_hits) = serve(200, TICKERS).await?;
        // Seeds picking either mirror first must both succeed.
        for seed in 0..4u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mirrors = config(vec![bad.clone(), good.clone()], 2);
            let keeper = OracleKeeper::try_new_with_rng(mirrors, &mut rng)?;
            let first = keeper.current_url().clone();
            let tickers = keeper.tickers().await?;
            assert_eq!(tickers.len(), 1);
            assert_eq!(*keeper.current_url(), good);
            if first == bad {
                assert_eq!(keeper.banned_urls(), vec![&bad]);
            } else {
                assert!(keeper.banned_urls().is_empty());
            }
        }
        assert_eq!(good_hits.load(Ordering::SeqCst), 4);
        assert!(bad_hits.load(Ordering::SeqCst) <= 4);
        Ok(())
    }

    #[tokio::test]
    async fn retries_are_bounded() -> eyre::Result<()> {
        let (bad, hits) = serve(200, "[]").await?;
        let keeper = OracleKeeper::try_new(config(vec![bad], 3))?;
        let err = keeper.tickers().await.unwrap_err();
        assert!(matches!(err, crate::Error::Transport(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[test]
    fn retry_delay_is_capped() {
        let config = OracleKeeperConfig::builder()
            .backoff(Duration::from_millis(100))
            .max_backoff(Duration::from_millis(500))
            .build();
        assert_eq!(config.retry_delay(1), Duration::from_millis(100));
        assert_eq!(config.retry_delay(3), Duration::from_millis(400));
        assert_eq!(config.retry_delay(10), Duration::from_millis(500));
    }

    #[test]
    fn keepers_by_chain() -> crate::Result<()> {
        let mut keepers = OracleKeepers::default();
        let arbitrum = keepers.get_or_create(ARBITRUM)?;
        let again = keepers.get_or_create(ARBITRUM)?;
        assert!(Arc::ptr_eq(&arbitrum, &again));
        let avalanche = keepers.get_or_create(AVALANCHE)?;
        assert_eq!(avalanche.config().chain_id, AVALANCHE);
        assert!(avalanche.current_url().as_str().contains("avalanche"));
        assert!(keepers.get(AVALANCHE_FUJI).is_none());
        Ok(())
    }
}
