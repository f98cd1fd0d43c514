use synthetics_model::BigInt;

/// Ticker of a token returned by the oracle keeper.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    /// Min price per whole token with `oracle_decimals` decimals.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub min_price: BigInt,
    /// Max price per whole token with `oracle_decimals` decimals.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_price: BigInt,
    /// Decimals of the prices.
    pub oracle_decimals: u8,
    /// Token symbol.
    #[serde(default)]
    pub token_symbol: String,
    /// Token address, kept unparsed so that malformed entries can be skipped.
    pub token_address: String,
    /// Update time in milliseconds.
    #[serde(default)]
    pub updated_at: Option<u64>,
}

/// Price candle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Candle {
    /// Open time in seconds.
    pub time: i64,
    /// Open price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Close price.
    pub close: f64,
}

impl From<[f64; 5]> for Candle {
    fn from([time, open, high, low, close]: [f64; 5]) -> Self {
        Self {
            time: time as i64,
            open,
            high,
            low,
            close,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct CandlesResponse {
    pub(super) candles: Vec<[f64; 5]>,
}

/// Candle period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Period {
    /// 1 minute.
    #[strum(serialize = "1m")]
    #[cfg_attr(feature = "clap", value(name = "1m"))]
    OneMinute,
    /// 5 minutes.
    #[strum(serialize = "5m")]
    #[cfg_attr(feature = "clap", value(name = "5m"))]
    FiveMinutes,
    /// 15 minutes.
    #[strum(serialize = "15m")]
    #[cfg_attr(feature = "clap", value(name = "15m"))]
    FifteenMinutes,
    /// 1 hour.
    #[strum(serialize = "1h")]
    #[cfg_attr(feature = "clap", value(name = "1h"))]
    OneHour,
    /// 4 hours.
    #[strum(serialize = "4h")]
    #[cfg_attr(feature = "clap", value(name = "4h"))]
    FourHours,
    /// 1 day.
    #[strum(serialize = "1d")]
    #[cfg_attr(feature = "clap", value(name = "1d"))]
    OneDay,
}
