//! NewsAPI `/v2/everything` client

use super::{Article, NewsProvider, NewsSearch};
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

const NEWSAPI_EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: NEWSAPI_EVERYTHING_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn search(&self, request: &NewsSearch) -> Result<Vec<Article>> {
        let page_size = request.page_size.to_string();
        let sources = request.sources.join(",");

        debug!(query = %request.query, "Calling NewsAPI");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", request.query.as_str()),
                ("sortBy", request.sort_by.as_str()),
                ("language", request.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("sources", sources.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key
                let e = e.without_url();
                error!("NewsAPI request failed: {}", e);
                AgentError::ProviderError(format!("NewsAPI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "NewsAPI returned an error status");
            return Err(AgentError::ProviderError(format!(
                "NewsAPI returned {}",
                status.as_u16()
            )));
        }

        let body: EverythingResponse = response.json().await.map_err(|e| {
            AgentError::ProviderError(format!("Invalid NewsAPI response: {}", e.without_url()))
        })?;

        let total = body.articles.len();
        let articles: Vec<Article> = body
            .articles
            .into_iter()
            .filter(|article| {
                article
                    .title
                    .as_deref()
                    .is_some_and(|title| !title.trim().is_empty())
            })
            .collect();
        if articles.len() < total {
            debug!(skipped = total - articles.len(), "Dropped untitled NewsAPI entries");
        }

        Ok(articles)
    }
}
