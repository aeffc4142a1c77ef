use anyhow::{Result, anyhow};
use chrono::NaiveTime;
use std::collections::BTreeSet;
use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

pub fn nse_all_indices_url(base: &str) -> String {
    format!("{}/api/allIndices", base.trim_end_matches('/'))
}

pub fn nse_index_constituents_url(base: &str, index: &str) -> String {
    format!(
        "{}/api/equity-stockIndices?index={}",
        base.trim_end_matches('/'),
        urlencoding::encode(index) // "NIFTY IT" -> "NIFTY%20IT"
    )
}

// -----------------------------------------------
// MARKET DEFAULTS
// -----------------------------------------------
pub const BENCHMARK_INDEX: &str = "NIFTY 50";

pub const SECTOR_INDICES: &[&str] = &[
    "NIFTY BANK",
    "NIFTY FINANCIAL SERVICES",
    "NIFTY FMCG",
    "NIFTY IT",
    "NIFTY PHARMA",
    "NIFTY AUTO",
    "NIFTY METAL",
    "NIFTY REALTY",
    "NIFTY ENERGY",
    "NIFTY MEDIA",
    "NIFTY HEALTHCARE INDEX",
    "NIFTY CONSUMER DURABLES",
    "NIFTY OIL & GAS",
    "NIFTY PSU BANK",
    "NIFTY PRIVATE BANK",
    "NIFTY INFRASTRUCTURE",
];

pub const MARKET_TIMEZONE: chrono_tz::Tz = chrono_tz::Asia::Kolkata;

pub const DEFAULT_GATE_HOUR: u32 = 9;
pub const DEFAULT_GATE_MINUTE: u32 = 20;

pub const DEFAULT_STOCK_COUNT: usize = 3;
pub const MIN_STOCK_COUNT: usize = 2;
pub const MAX_STOCK_COUNT: usize = 5;

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(7);
pub const WARMUP_TIMEOUT: Duration = Duration::from_secs(5);

// -----------------------------------------------
// SESSION WARMUP
// -----------------------------------------------
pub const WARMUP_DELAY_MS: u64 = 200;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_DELAY_MS: u64 = 400;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_REFERER: &str = "https://www.nseindia.com/";
pub const HEADER_ACCEPT_JSON: &str = "application/json, text/plain, */*";
pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// PIPELINE CONFIGURATION
// -----------------------------------------------

/// Immutable inputs to the ranking stages.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub benchmark: String,
    pub sectors: BTreeSet<String>,
}

impl FilterConfig {
    pub fn new<I, S>(benchmark: impl Into<String>, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            benchmark: benchmark.into(),
            sectors: sectors.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new(BENCHMARK_INDEX, SECTOR_INDICES.iter().copied())
    }
}

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to filter
pub fn get_execution_mode() -> String {
    std::env::var("NSE_MODE").unwrap_or_else(|_| "filter".to_string())
}

pub fn get_base_url() -> String {
    std::env::var("NSE_BASE_URL").unwrap_or_else(|_| NSE_BASE_URL.to_string())
}

pub fn get_port() -> u16 {
    std::env::var("NSE_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(3001)
}

/// Stock count from `NSE_STOCK_COUNT`, clamped to the supported range
pub fn get_stock_count() -> usize {
    std::env::var("NSE_STOCK_COUNT")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map(clamp_stock_count)
        .unwrap_or(DEFAULT_STOCK_COUNT)
}

pub fn clamp_stock_count(count: usize) -> usize {
    count.clamp(MIN_STOCK_COUNT, MAX_STOCK_COUNT)
}

/// Gate time from `NSE_GATE` ("HH:MM"); 09:20 when unset
pub fn get_gate_time() -> Result<NaiveTime> {
    gate_from_env_value(std::env::var("NSE_GATE").ok().as_deref())
}

fn gate_from_env_value(value: Option<&str>) -> Result<NaiveTime> {
    match value {
        None => Ok(default_gate_time()),
        Some(raw) => parse_gate(raw).ok_or_else(|| anyhow!("Invalid NSE_GATE '{}'. Use HH:MM (00:00-23:59)", raw)),
    }
}

pub fn get_override_gate() -> bool {
    std::env::var("NSE_OVERRIDE_GATE")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

pub fn default_gate_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_GATE_HOUR, DEFAULT_GATE_MINUTE, 0).unwrap_or(NaiveTime::MIN)
}

pub fn parse_gate(value: &str) -> Option<NaiveTime> {
    let (h, m) = value.trim().split_once(':')?;
    NaiveTime::from_hms_opt(h.trim().parse().ok()?, m.trim().parse().ok()?, 0)
}
