use anyhow::Result;
use colored::Colorize;
use nse_sector_filter::app_config::AppConfig;
use nse_sector_filter::logging;
use nse_sector_filter::nse_commands::NSECommands;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let app_config = match AppConfig::from_env().and_then(|cfg| cfg.validate().map(|_| cfg)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            NSECommands::print_usage();
            std::process::exit(1);
        }
    };

    tracing::info!(
        mode = %app_config.mode,
        count = app_config.stock_count,
        gate = %app_config.gate_time,
        override_gate = app_config.override_gate,
        "Starting"
    );

    match app_config.mode.as_str() {
        "server" => NSECommands::run_server(app_config.port).await?,
        _ => {
            let completed = NSECommands::run_filter(
                app_config.stock_count,
                app_config.gate_time,
                app_config.override_gate,
            )
            .await?;
            if !completed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
