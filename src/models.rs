use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One untyped row from an NSE JSON payload
pub type RawRow = Map<String, Value>;

/// Overall market direction derived from the benchmark index
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Bullish only on a strictly positive change; flat counts as bearish
    pub fn from_percent_change(pct: f64) -> Self {
        if pct > 0.0 { Trend::Bullish } else { Trend::Bearish }
    }

    /// Bearish runs surface the weakest first, bullish runs the strongest
    pub fn ascending(self) -> bool {
        self == Trend::Bearish
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "BULLISH"),
            Trend::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// Benchmark reading used to decide the trend
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendReading {
    pub trend: Trend,
    pub percent_change: f64,
    pub benchmark_found: bool,
}

/// A sector index with its resolved percent change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectorRank {
    pub sector: String,
    pub percent_change: f64,
}

/// A fully resolved constituent row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub symbol: String,
    pub last_price: f64,
    pub percent_change: f64,
    /// Passed through as NSE sent it (number or string)
    pub volume: Option<Value>,
}

/// Everything the presentation layer needs from one run
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterReport {
    pub trend: Trend,
    pub benchmark_change: f64,
    pub sectors: Vec<SectorRank>,
    pub selected_sector: String,
    pub stocks: Vec<StockRow>,
}

/// `/api/allIndices` and `/api/equity-stockIndices` both wrap rows in `data`,
/// though the index list has been seen at the root as well.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RowsPayload {
    Bare(Vec<RawRow>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<RawRow>>,
    },
}

impl RowsPayload {
    pub fn into_rows(self) -> Vec<RawRow> {
        match self {
            RowsPayload::Bare(rows) => rows,
            RowsPayload::Wrapped { data } => data.unwrap_or_default(),
        }
    }
}
