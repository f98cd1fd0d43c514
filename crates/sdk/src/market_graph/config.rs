/// Config for [`MarketGraph`](super::MarketGraph).
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MarketGraphConfig {
    /// Max number of swap steps of a path. Unlimited if `None`.
    pub max_steps: Option<usize>,
}

impl MarketGraphConfig {
    pub(super) fn accepts(&self, steps: usize) -> bool {
        self.max_steps.map(|max| steps <= max).unwrap_or(true)
    }
}
