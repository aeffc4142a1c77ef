use crate::config;
use crate::error::FetchError;
use crate::models::{RawRow, RowsPayload};
use anyhow::{Context, Result};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{Client, header};
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

/// Source of raw NSE rows consumed by the filter pipeline.
pub trait MarketDataSource {
    /// Every index row from `/api/allIndices`.
    fn fetch_all_indices(&self) -> impl Future<Output = Result<Vec<RawRow>, FetchError>> + Send;

    /// Constituent rows for one index from `/api/equity-stockIndices`.
    fn fetch_sector_constituents(
        &self,
        sector: &str,
    ) -> impl Future<Output = Result<Vec<RawRow>, FetchError>> + Send;
}

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct NSEClient {
    client: Client,
    base_url: String,
    warmed_up: RwLock<bool>,
}

impl NSEClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(config::get_base_url())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            warmed_up: RwLock::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Visit the home page once so NSE hands out its session cookies.
    /// A failed warmup is logged; the API call that follows decides the outcome.
    async fn warmup_if_needed(&self) {
        if *self.warmed_up.read().await {
            return;
        }

        let mut warmed = self.warmed_up.write().await;
        if *warmed {
            return;
        }

        match self
            .client
            .get(&self.base_url)
            .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
            .timeout(config::WARMUP_TIMEOUT)
            .send()
            .await
        {
            Ok(res) => debug!(status = res.status().as_u16(), "NSE session warmed up"),
            Err(e) => warn!(error = %e, "NSE session warmup failed, continuing"),
        }

        tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
        *warmed = true;
    }

    /// GET with a fixed-interval retry; any transport error, non-2xx status
    /// or non-JSON body counts as a failed attempt.
    async fn fetch_json(&self, url: &str) -> Result<String, FetchError> {
        self.warmup_if_needed().await;

        let strategy = FixedInterval::from_millis(config::RETRY_DELAY_MS)
            .take(config::RETRY_MAX_ATTEMPTS.saturating_sub(1));

        let mut attempts = 0usize;
        let outcome = Retry::spawn(strategy, || {
            attempts += 1;
            let attempt = attempts;
            async move {
                let result = self.fetch_once(url).await;
                if let Err(e) = &result {
                    warn!(url, attempt, error = %e, "NSE request failed");
                }
                result
            }
        })
        .await;

        outcome.map_err(|last| FetchError::Exhausted {
            url: url.to_string(),
            attempts,
            last: Box::new(last),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let res = self
            .client
            .get(url)
            .header(header::REFERER, config::HEADER_REFERER)
            .header(header::ACCEPT, config::HEADER_ACCEPT_JSON)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                preview: text.chars().take(200).collect(),
            });
        }

        let trimmed = text.trim_start();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return Err(FetchError::NonJsonResponse(text.chars().take(200).collect()));
        }

        debug!(url, bytes = text.len(), "NSE response received");
        Ok(text)
    }

    async fn fetch_rows(&self, url: &str) -> Result<Vec<RawRow>, FetchError> {
        let text = self.fetch_json(url).await?;
        let payload: RowsPayload = serde_json::from_str(&text)?;
        Ok(payload.into_rows())
    }
}

impl MarketDataSource for NSEClient {
    async fn fetch_all_indices(&self) -> Result<Vec<RawRow>, FetchError> {
        let url = config::nse_all_indices_url(&self.base_url);
        let rows = self.fetch_rows(&url).await?;
        info!(rows = rows.len(), "Fetched index list");
        Ok(rows)
    }

    async fn fetch_sector_constituents(&self, sector: &str) -> Result<Vec<RawRow>, FetchError> {
        let url = config::nse_index_constituents_url(&self.base_url, sector);
        let rows = self.fetch_rows(&url).await?;
        info!(sector, rows = rows.len(), "Fetched sector constituents");
        Ok(rows)
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}
