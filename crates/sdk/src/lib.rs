#![deny(missing_docs)]
#![deny(unreachable_pub)]

//! Routing, market selection, oracle and leaderboard utilities built on
//! [`synthetics_model`].

/// Error type.
pub mod error;

/// Market calculations.
pub mod market;

/// Maintains a graph structured with markets as edges.
#[cfg(feature = "market-graph")]
pub mod market_graph;

/// Swap routes.
#[cfg(feature = "market-graph")]
pub mod route;

/// Oracle keeper client.
#[cfg(feature = "oracle")]
pub mod oracle;

/// Snapshot file schema.
pub mod schema;

/// Trade validation.
pub mod validation;

/// Leaderboard summaries.
pub mod leaderboard;

/// Utils.
pub mod utils;

/// Model support.
pub mod model {
    pub use synthetics_model::*;
}

pub use error::Error;

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
