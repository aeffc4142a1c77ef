use crate::models::{RawRow, SectorRank, StockRow, Trend, TrendReading};
use crate::normalizer;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Classify market direction from the benchmark row.
///
/// Only the first row whose trimmed, upper-cased name equals the benchmark
/// is consulted. A missing benchmark or unreadable change degrades to 0.0,
/// which reads as bearish.
pub fn classify_trend(rows: &[RawRow], benchmark: &str) -> TrendReading {
    let wanted = normalizer::name_key(benchmark);

    let benchmark_row = rows.iter().find(|row| {
        normalizer::index_name(row)
            .map(|name| normalizer::name_key(&name) == wanted)
            .unwrap_or(false)
    });

    let resolved = benchmark_row.and_then(normalizer::index_percent_change);
    if resolved.is_none() {
        warn!(
            benchmark,
            found = benchmark_row.is_some(),
            "Benchmark percent change unavailable, defaulting to 0.0"
        );
    }

    let percent_change = resolved.unwrap_or(0.0);
    TrendReading {
        trend: Trend::from_percent_change(percent_change),
        percent_change,
        benchmark_found: benchmark_row.is_some(),
    }
}

/// Rank the known sector indices in the direction of the trend.
///
/// Rows outside `sectors` or without a readable change are dropped. Set
/// membership uses the same name normalization as [`classify_trend`].
pub fn rank_sectors(rows: &[RawRow], sectors: &BTreeSet<String>, trend: Trend) -> Vec<SectorRank> {
    let known: BTreeSet<String> = sectors.iter().map(|s| normalizer::name_key(s)).collect();

    let mut ranked: Vec<SectorRank> = rows
        .iter()
        .filter_map(|row| {
            let name = normalizer::index_name(row)?;
            if !known.contains(&normalizer::name_key(&name)) {
                return None;
            }
            match normalizer::index_percent_change(row) {
                Some(percent_change) => Some(SectorRank { sector: name, percent_change }),
                None => {
                    debug!(sector = %name, "Dropping sector without percent change");
                    None
                }
            }
        })
        .collect();

    ranked.sort_by(|a, b| directional_cmp(a.percent_change, b.percent_change, trend));
    ranked
}

/// Rank a sector's constituents and keep the first `count`.
///
/// Only rows missing symbol, price or change are dropped; NSE's summary row
/// for the index itself ranks like any other row.
pub fn rank_constituents(rows: &[RawRow], count: usize, trend: Trend) -> Vec<StockRow> {
    let mut stocks: Vec<StockRow> = rows.iter().filter_map(normalizer::stock_row).collect();

    debug!(valid = stocks.len(), total = rows.len(), "Normalized constituents");

    stocks.sort_by(|a, b| directional_cmp(a.percent_change, b.percent_change, trend));
    stocks.truncate(count);
    stocks
}

/// Stable-sort comparator: ascending for bearish, descending for bullish.
/// Numerically equal values (including -0.0 and 0.0) compare equal so they
/// keep input order; coercion already rejects NaN.
fn directional_cmp(a: f64, b: f64, trend: Trend) -> Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    if trend.ascending() { ord } else { ord.reverse() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rows(values: Value) -> Vec<RawRow> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn sector_set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_trend_bearish_from_pchange_string() {
        let data = rows(json!([
            { "index": "NIFTY NEXT 50", "percentChange": 1.0 },
            { "index": "NIFTY 50", "pChange": "-0.42" },
        ]));
        let reading = classify_trend(&data, "NIFTY 50");
        assert_eq!(reading.trend, Trend::Bearish);
        assert_eq!(reading.percent_change, -0.42);
        assert!(reading.benchmark_found);
    }

    #[test]
    fn test_classify_trend_matches_case_and_whitespace() {
        let data = rows(json!([{ "indexSymbol": "  nifty 50 ", "percentChange": 0.7 }]));
        let reading = classify_trend(&data, "NIFTY 50");
        assert_eq!(reading.trend, Trend::Bullish);
        assert_eq!(reading.percent_change, 0.7);
    }

    #[test]
    fn test_classify_trend_uses_first_match_only() {
        let data = rows(json!([
            { "index": "NIFTY 50", "percentChange": -1.0 },
            { "index": "NIFTY 50", "percentChange": 2.0 },
        ]));
        assert_eq!(classify_trend(&data, "NIFTY 50").percent_change, -1.0);
    }

    #[test]
    fn test_classify_trend_defaults_to_bearish_zero() {
        let missing = rows(json!([{ "index": "NIFTY BANK", "percentChange": 3.0 }]));
        let reading = classify_trend(&missing, "NIFTY 50");
        assert_eq!(reading.trend, Trend::Bearish);
        assert_eq!(reading.percent_change, 0.0);
        assert!(!reading.benchmark_found);

        let unreadable = rows(json!([{ "index": "NIFTY 50", "percentChange": "-" }]));
        let reading = classify_trend(&unreadable, "NIFTY 50");
        assert_eq!(reading.trend, Trend::Bearish);
        assert_eq!(reading.percent_change, 0.0);
        assert!(reading.benchmark_found);

        let flat = rows(json!([{ "index": "NIFTY 50", "percentChange": 0 }]));
        assert_eq!(classify_trend(&flat, "NIFTY 50").trend, Trend::Bearish);
    }

    #[test]
    fn test_rank_sectors_bearish_ascending() {
        let data = rows(json!([
            { "index": "NIFTY 50", "percentChange": -0.42 },
            { "index": "NIFTY FMCG", "percentChange": -0.3 },
            { "index": "NIFTY IT", "percentChange": -2.1 },
            { "index": "NIFTY SMALLCAP 100", "percentChange": -4.0 },
        ]));
        let ranked = rank_sectors(&data, &sector_set(&["NIFTY IT", "NIFTY FMCG"]), Trend::Bearish);
        let names: Vec<&str> = ranked.iter().map(|s| s.sector.as_str()).collect();
        assert_eq!(names, vec!["NIFTY IT", "NIFTY FMCG"]);
    }

    #[test]
    fn test_rank_sectors_bullish_descending_and_drops_unresolved() {
        let data = rows(json!([
            { "index": "NIFTY AUTO", "percentChange": 0.5 },
            { "index": "NIFTY METAL", "percChange": "1.8" },
            { "index": "NIFTY PHARMA", "percentChange": null },
            { "index": "NIFTY BANK", "pChange": -0.2 },
        ]));
        let set = sector_set(&["NIFTY AUTO", "NIFTY METAL", "NIFTY PHARMA", "NIFTY BANK"]);
        let ranked = rank_sectors(&data, &set, Trend::Bullish);
        let changes: Vec<f64> = ranked.iter().map(|s| s.percent_change).collect();
        assert_eq!(changes, vec![1.8, 0.5, -0.2]);
        assert!(ranked.iter().all(|s| s.sector != "NIFTY PHARMA"));
    }

    #[test]
    fn test_rank_sectors_ties_keep_input_order() {
        let data = rows(json!([
            { "index": "NIFTY AUTO", "percentChange": 1.0 },
            { "index": "NIFTY BANK", "percentChange": 1.0 },
            { "index": "NIFTY IT", "percentChange": 1.0 },
        ]));
        let set = sector_set(&["NIFTY AUTO", "NIFTY BANK", "NIFTY IT"]);
        for trend in [Trend::Bullish, Trend::Bearish] {
            let names: Vec<String> = rank_sectors(&data, &set, trend).into_iter().map(|s| s.sector).collect();
            assert_eq!(names, vec!["NIFTY AUTO", "NIFTY BANK", "NIFTY IT"]);
        }
    }

    #[test]
    fn test_rank_sectors_signed_zero_ties_keep_input_order() {
        let data = rows(json!([
            { "index": "NIFTY AUTO", "percentChange": 0.0 },
            { "index": "NIFTY BANK", "percentChange": "-0.00" },
        ]));
        let set = sector_set(&["NIFTY AUTO", "NIFTY BANK"]);
        for trend in [Trend::Bullish, Trend::Bearish] {
            let names: Vec<String> = rank_sectors(&data, &set, trend).into_iter().map(|s| s.sector).collect();
            assert_eq!(names, vec!["NIFTY AUTO", "NIFTY BANK"]);
        }
    }

    #[test]
    fn test_rank_sectors_membership_is_case_insensitive() {
        let data = rows(json!([{ "index": "nifty it ", "percentChange": 1.2 }]));
        let ranked = rank_sectors(&data, &sector_set(&["NIFTY IT"]), Trend::Bullish);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].sector, "nifty it");
    }

    #[test]
    fn test_rank_sectors_uses_injected_set() {
        let data = rows(json!([
            { "index": "NIFTY IT", "percentChange": 1.0 },
            { "index": "NIFTY MIDCAP 50", "percentChange": 2.0 },
        ]));
        let ranked = rank_sectors(&data, &sector_set(&["NIFTY MIDCAP 50"]), Trend::Bullish);
        assert_eq!(ranked, vec![SectorRank { sector: "NIFTY MIDCAP 50".to_string(), percent_change: 2.0 }]);
        assert!(rank_sectors(&data, &BTreeSet::new(), Trend::Bullish).is_empty());
    }

    #[test]
    fn test_rank_constituents_bearish_top_two() {
        let data = rows(json!([
            { "symbol": "A", "lastPrice": 10.0, "pChange": -3.0 },
            { "symbol": "B", "lastPrice": 20.0, "pChange": -1.0 },
            { "symbol": "C", "lastPrice": 30.0, "pChange": -5.0 },
        ]));
        let top = rank_constituents(&data, 2, Trend::Bearish);
        let symbols: Vec<&str> = top.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A"]);
        assert_eq!(top[0].percent_change, -5.0);
        assert_eq!(top[1].percent_change, -3.0);
    }

    #[test]
    fn test_rank_constituents_bullish_skips_incomplete_rows_only() {
        let data = rows(json!([
            { "symbol": "NIFTY IT", "lastPrice": 35000.0, "pChange": 9.0 },
            { "symbol": "INFY", "lastPrice": 1500.0, "pChange": 1.1, "totalTradedVolume": 5000 },
            { "symbol": "TCS", "pChange": 4.0 },
            { "symbol": "WIPRO", "last": "480.5", "perChange": "2.2" },
            { "lastPrice": 10.0, "pChange": 8.0 },
        ]));
        let top = rank_constituents(&data, 5, Trend::Bullish);
        let symbols: Vec<&str> = top.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NIFTY IT", "WIPRO", "INFY"]);
        assert_eq!(top[2].volume, Some(json!(5000)));
        assert_eq!(top[1].volume, None);
    }

    #[test]
    fn test_rank_constituents_keeps_index_summary_row() {
        let data = rows(json!([
            { "symbol": "NIFTY IT", "lastPrice": 35000.0, "pChange": 0.4 },
            { "symbol": "INFY", "lastPrice": 1500.0, "pChange": 1.1 },
        ]));
        assert_eq!(rank_constituents(&data, 5, Trend::Bullish).len(), 2);
    }

    #[test]
    fn test_rank_constituents_length_is_min_of_count_and_valid() {
        let data = rows(json!([
            { "symbol": "A", "lastPrice": 1.0, "pChange": 1.0 },
            { "symbol": "B", "lastPrice": 1.0, "pChange": 2.0 },
            { "symbol": "C", "lastPrice": 1.0, "pChange": 3.0 },
        ]));
        assert_eq!(rank_constituents(&data, 2, Trend::Bullish).len(), 2);
        assert_eq!(rank_constituents(&data, 10, Trend::Bullish).len(), 3);
        assert!(rank_constituents(&data, 0, Trend::Bullish).is_empty());
        assert!(rank_constituents(&[], 3, Trend::Bullish).is_empty());
    }

    #[test]
    fn test_rankers_are_pure() {
        let data = rows(json!([
            { "index": "NIFTY AUTO", "percentChange": 0.3, "symbol": "A", "lastPrice": 1.0, "pChange": 0.3 },
            { "index": "NIFTY BANK", "percentChange": -0.9, "symbol": "B", "lastPrice": 1.0, "pChange": -0.9 },
        ]));
        let set = sector_set(&["NIFTY AUTO", "NIFTY BANK"]);
        assert_eq!(rank_sectors(&data, &set, Trend::Bearish), rank_sectors(&data, &set, Trend::Bearish));
        assert_eq!(
            rank_constituents(&data, 3, Trend::Bullish),
            rank_constituents(&data, 3, Trend::Bullish)
        );
    }
}
