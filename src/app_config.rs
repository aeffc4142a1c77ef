use crate::config;
use anyhow::{Result, bail};
use chrono::NaiveTime;

/// Application configuration handler
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: String,
    pub port: u16,
    pub stock_count: usize,
    pub gate_time: NaiveTime,
    pub override_gate: bool,
}

impl AppConfig {
    /// Create new configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            mode: config::get_execution_mode(),
            port: config::get_port(),
            stock_count: config::get_stock_count(),
            gate_time: config::get_gate_time()?,
            override_gate: config::get_override_gate(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.mode.as_str(), "filter" | "server") {
            bail!("Invalid mode '{}'. Use 'filter' or 'server'", self.mode);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(mode: &str) -> AppConfig {
        AppConfig {
            mode: mode.to_string(),
            port: 3001,
            stock_count: 3,
            gate_time: config::default_gate_time(),
            override_gate: false,
        }
    }

    #[test]
    fn test_validate_modes() {
        assert!(sample("filter").validate().is_ok());
        assert!(sample("server").validate().is_ok());
        assert!(sample("batch").validate().is_err());
    }
}
