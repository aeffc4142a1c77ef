pub mod api_server;
pub mod app_config;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod nse_client;
pub mod nse_commands;
pub mod pipeline;
pub mod processor;

// Re-exports (public API)
pub use config::FilterConfig;
pub use error::{FetchError, PipelineError};
pub use models::{FilterReport, RawRow, SectorRank, StockRow, Trend, TrendReading};
pub use nse_client::{MarketDataSource, NSEClient};
pub use pipeline::run_filter;
pub use processor::{classify_trend, rank_constituents, rank_sectors};
