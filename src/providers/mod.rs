//! Remote data providers
//!
//! Thin HTTP clients for the news-search and intraday-price services.
//! Capability adapters talk to these through traits so tests can swap in
//! stubs.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod alphavantage;
pub mod newsapi;

pub use alphavantage::AlphaVantageClient;
pub use newsapi::NewsApiClient;

/// Parameters for one news-search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsSearch {
    pub query: String,
    pub sources: Vec<String>,
    pub language: String,
    pub page_size: u32,
    pub sort_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// NewsAPI sends `null` for removed articles.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Intraday bars keyed by timestamp. Keys sort chronologically.
pub type IntradaySeries = BTreeMap<String, serde_json::Value>;

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, request: &NewsSearch) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait IntradayProvider: Send + Sync {
    /// Five-minute bars for `symbol`. A non-success HTTP status is reported
    /// as `AgentError::ProviderStatus`.
    async fn intraday(&self, symbol: &str) -> Result<IntradaySeries>;
}
