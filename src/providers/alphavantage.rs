//! Alpha Vantage `TIME_SERIES_INTRADAY` client

use super::{IntradayProvider, IntradaySeries};
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
const INTERVAL: &str = "5min";

pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: ALPHA_VANTAGE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct IntradayResponse {
    #[serde(rename = "Time Series (5min)", default)]
    time_series: IntradaySeries,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl IntradayResponse {
    /// Rate limiting and bad symbols come back as 200 with one of these and no series.
    fn notice(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }
}

#[async_trait]
impl IntradayProvider for AlphaVantageClient {
    async fn intraday(&self, symbol: &str) -> Result<IntradaySeries> {
        debug!(symbol, "Calling Alpha Vantage");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_INTRADAY"),
                ("symbol", symbol),
                ("interval", INTERVAL),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Alpha Vantage request failed: {}", e);
                AgentError::ProviderError(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), symbol, "Alpha Vantage returned an error status");
            return Err(AgentError::ProviderStatus(status.as_u16()));
        }

        let body: IntradayResponse = response.json().await.map_err(|e| {
            AgentError::ProviderError(format!("invalid response: {}", e.without_url()))
        })?;

        if let Some(message) = body.notice() {
            warn!(symbol, detail = message, "Alpha Vantage returned no series");
        }

        Ok(body.time_series)
    }
}
