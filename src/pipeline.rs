use crate::config::FilterConfig;
use crate::error::PipelineError;
use crate::models::FilterReport;
use crate::nse_client::MarketDataSource;
use crate::processor;
use tracing::info;

/// Trend -> sector ranking -> constituent ranking.
///
/// The index list is fetched once and shared by the trend and sector stages.
/// A fetch failure or an empty stage ends the run with no partial report.
pub async fn run_filter<S: MarketDataSource>(
    source: &S,
    config: &FilterConfig,
    count: usize,
) -> Result<FilterReport, PipelineError> {
    let indices = source.fetch_all_indices().await?;

    let reading = processor::classify_trend(&indices, &config.benchmark);
    info!(
        trend = %reading.trend,
        pct = reading.percent_change,
        found = reading.benchmark_found,
        "Market trend classified"
    );

    let sectors = processor::rank_sectors(&indices, &config.sectors, reading.trend);
    let selected_sector = sectors
        .first()
        .map(|s| s.sector.clone())
        .ok_or(PipelineError::NoSectorData)?;
    info!(sector = %selected_sector, ranked = sectors.len(), "Sector selected");

    let constituents = source.fetch_sector_constituents(&selected_sector).await?;
    let stocks = processor::rank_constituents(&constituents, count, reading.trend);
    if stocks.is_empty() {
        return Err(PipelineError::NoConstituentData { sector: selected_sector });
    }

    Ok(FilterReport {
        trend: reading.trend,
        benchmark_change: reading.percent_change,
        sectors,
        selected_sector,
        stocks,
    })
}
