use crate::config::{self, FilterConfig};
use crate::gate::GateCheck;
use crate::models::FilterReport;
use crate::nse_client::NSEClient;
use crate::pipeline;
use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct FilterQuery {
    pub count: Option<usize>,
    pub gate_hour: Option<u32>,
    pub gate_minute: Option<u32>,
    #[serde(default)]
    pub override_gate: bool,
}

impl FilterQuery {
    /// Count clamped to 2..=5; an out-of-range gate is rejected
    pub fn resolve(&self) -> Result<(usize, NaiveTime), String> {
        let count = self
            .count
            .map(config::clamp_stock_count)
            .unwrap_or(config::DEFAULT_STOCK_COUNT);
        let hour = self.gate_hour.unwrap_or(config::DEFAULT_GATE_HOUR);
        let minute = self.gate_minute.unwrap_or(config::DEFAULT_GATE_MINUTE);
        let gate = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| format!("Invalid gate time {:02}:{:02}", hour, minute))?;
        Ok((count, gate))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start_time: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start_time.elapsed().as_millis() as u64),
        }
    }

    fn fail(error: String, start_time: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            processing_time_ms: Some(start_time.elapsed().as_millis() as u64),
        }
    }
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

/// Shared read-only settings; every request builds its own NSE session.
#[derive(Clone)]
pub struct AppState {
    filter_config: Arc<FilterConfig>,
    base_url: Arc<String>,
}

impl AppState {
    pub fn new(filter_config: FilterConfig, base_url: impl Into<String>) -> Self {
        Self {
            filter_config: Arc::new(filter_config),
            base_url: Arc::new(base_url.into()),
        }
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/filter?count=3&gate_hour=9&gate_minute=20&override_gate=false
async fn get_filter(
    State(app_state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Json<ApiResponse<FilterReport>> {
    let start_time = Instant::now();
    let (count, gate_time) = match query.resolve() {
        Ok(resolved) => resolved,
        Err(e) => return Json(ApiResponse::fail(e, start_time)),
    };

    let gate = GateCheck::evaluate_now(gate_time, query.override_gate);
    if !gate.allowed {
        return Json(ApiResponse::fail(gate.wait_message(), start_time));
    }

    let client = match NSEClient::with_base_url(app_state.base_url.as_str()) {
        Ok(client) => client,
        Err(e) => return Json(ApiResponse::fail(e.to_string(), start_time)),
    };

    match pipeline::run_filter(&client, &app_state.filter_config, count).await {
        Ok(report) => {
            info!(sector = %report.selected_sector, stocks = report.stocks.len(), "Filter request served");
            Json(ApiResponse::ok(report, start_time))
        }
        Err(e) => {
            error!(error = %e, "Filter request failed");
            Json(ApiResponse::fail(e.to_string(), start_time))
        }
    }
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/filter", get(get_filter))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn start_server(port: u16) -> Result<()> {
    let app = router(AppState::new(FilterConfig::default(), config::get_base_url()));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "API server listening");
    println!("🚀 NSE Sector Filter API running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /health");
    println!("   GET  /api/filter?count=3&gate_hour=9&gate_minute=20&override_gate=false");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
