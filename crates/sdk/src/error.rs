/// SDK Error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model Error.
    #[error("model: {0}")]
    Model(#[from] synthetics_model::Error),
    /// Market Graph Errors
    #[cfg(feature = "market-graph")]
    #[error("market-graph: {0}")]
    MarketGraph(#[from] crate::market_graph::error::MarketGraphError),
    /// Unknown error.
    #[error("unknown: {0}")]
    Unknown(String),
    /// Transport error.
    #[error("transport: {0}")]
    Transport(String),
    /// Invalid snapshot.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    /// Not found error.
    #[error("not found")]
    NotFound,
    /// Reqwest error.
    #[cfg(feature = "reqwest")]
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Url parse error.
    #[cfg(feature = "url")]
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
    /// Json error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an unknown error.
    pub fn unknown(msg: impl ToString) -> Self {
        Self::Unknown(msg.to_string())
    }

    /// Create a transport error.
    pub fn transport(msg: impl ToString) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Create an invalid snapshot error.
    pub fn invalid_snapshot(msg: impl ToString) -> Self {
        Self::InvalidSnapshot(msg.to_string())
    }
}
