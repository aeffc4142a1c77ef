use crate::api_server;
use crate::config::{self, FilterConfig};
use crate::gate::GateCheck;
use crate::models::{FilterReport, Trend};
use crate::nse_client::NSEClient;
use crate::pipeline;

use anyhow::Result;
use chrono::NaiveTime;
use colored::Colorize;
use serde_json::Value;
use tracing::error;

/// NSE Command Handler - one-shot filter run and API server
pub struct NSECommands;

impl NSECommands {
    /// Check the gate, run the pipeline once and print the report.
    /// Returns `Ok(false)` when the run was blocked or failed with a user-facing message.
    pub async fn run_filter(count: usize, gate_time: NaiveTime, override_gate: bool) -> Result<bool> {
        println!("{}", "=".repeat(60).blue());
        println!("{}", "NSE Intraday Sector Filter".green().bold());
        println!("{}", "=".repeat(60).blue());
        println!();

        let gate = GateCheck::evaluate_now(gate_time, override_gate);
        if !gate.allowed {
            println!("{} {}", "⏳".yellow(), gate.wait_message().yellow());
            return Ok(false);
        }

        println!("{} Time: {} IST", "🕒".blue(), gate.now.format("%I:%M:%S %p"));
        println!();

        let client = NSEClient::new()?;
        let filter_config = FilterConfig::default();

        match pipeline::run_filter(&client, &filter_config, count).await {
            Ok(report) => {
                Self::display_report(&report);
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, "Filter run failed");
                println!("{} Error: {}", "✗".red(), e.to_string().red());
                Ok(false)
            }
        }
    }

    /// Run API server mode
    pub async fn run_server(port: u16) -> Result<()> {
        println!("{}", "=".repeat(60).blue());
        println!("{}", "NSE Sector Filter API Server".green().bold());
        println!("{}", "=".repeat(60).blue());
        println!();

        api_server::start_server(port).await
    }

    fn display_report(report: &FilterReport) {
        let marker = match report.trend {
            Trend::Bullish => "🟢",
            Trend::Bearish => "🔴",
        };
        let trend = match report.trend {
            Trend::Bullish => report.trend.to_string().green().bold(),
            Trend::Bearish => report.trend.to_string().red().bold(),
        };
        println!(
            "{} Market Trend: {} ({}: {:.2}%)",
            marker,
            trend,
            config::BENCHMARK_INDEX,
            report.benchmark_change
        );
        println!();

        println!("{}", "Sector Ranking (by % change):".cyan());
        for (rank, sector) in report.sectors.iter().enumerate() {
            println!(
                "  {:>2}. {:<28} {}",
                rank + 1,
                sector.sector,
                Self::colored_pct(sector.percent_change)
            );
        }
        println!();

        println!("{} Selected Sector ➜ {}", "✓".green(), report.selected_sector.yellow().bold());
        println!();

        println!("{}", "🎯 Selected Stocks".cyan().bold());
        println!("  {:<14} {:>12} {:>9} {:>14}", "SYMBOL", "LAST PRICE", "% CHG", "VOLUME");
        for stock in &report.stocks {
            let volume = match &stock.volume {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "-".to_string(),
            };
            println!(
                "  {:<14} {:>12.2} {:>9} {:>14}",
                stock.symbol.yellow(),
                stock.last_price,
                Self::colored_pct(stock.percent_change),
                volume
            );
        }
        println!();
        println!("{}", "=".repeat(60).blue());
    }

    fn colored_pct(pct: f64) -> colored::ColoredString {
        let text = format!("{:+.2}%", pct);
        if pct > 0.0 { text.green() } else { text.red() }
    }

    /// Print usage instructions
    pub fn print_usage() {
        eprintln!("Set NSE_MODE environment variable to control execution mode");
        eprintln!("Examples:");
        eprintln!("  NSE_MODE=filter NSE_STOCK_COUNT=3 cargo run          # One-shot filter run");
        eprintln!("  NSE_MODE=filter NSE_OVERRIDE_GATE=true cargo run     # Ignore the 09:20 IST gate");
        eprintln!("  NSE_MODE=filter NSE_GATE=09:30 cargo run             # Custom gate time");
        eprintln!("  NSE_MODE=server NSE_PORT=3001 cargo run              # Start API server on port 3001");
    }
}
