//! Capabilities the reasoning loop can invoke
//!
//! The set is fixed: news lookup and intraday price lookup. Every
//! invocation goes through the request's `CallBudget` and always yields a
//! textual observation, never an error.

use crate::budget::CallBudget;
use crate::config::AgentConfig;
use crate::models::CapabilityKind;
use crate::providers::{AlphaVantageClient, NewsApiClient};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub mod news;
pub mod price;

pub use news::NewsLookup;
pub use price::PriceLookup;

/// Result of handing one selection to a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The provider was called; this is its normalized summary.
    Completed(String),
    /// Quota already spent; this is the policy message.
    Exhausted(String),
}

impl Invocation {
    pub fn observation(&self) -> &str {
        match self {
            Invocation::Completed(text) | Invocation::Exhausted(text) => text,
        }
    }
}

#[async_trait]
pub trait Capability: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    /// Shown to the model so it can decide when the capability applies.
    fn description(&self) -> &'static str;

    /// Observation returned once the quota is spent.
    fn exhausted_message(&self) -> &'static str;

    /// Calls the provider and summarizes the result. Failures come back as text.
    async fn fetch(&self, argument: &str) -> String;

    async fn invoke(&self, argument: &str, budget: &mut CallBudget) -> Invocation {
        if !budget.try_consume(self.kind()) {
            debug!(capability = %self.kind(), "Call budget exhausted");
            return Invocation::Exhausted(self.exhausted_message().to_string());
        }

        Invocation::Completed(self.fetch(argument).await)
    }
}

/// The fixed capability set handed to the reasoning loop.
pub struct CapabilitySet {
    news: Arc<dyn Capability>,
    price: Arc<dyn Capability>,
}

impl CapabilitySet {
    pub fn new(news: Arc<dyn Capability>, price: Arc<dyn Capability>) -> Self {
        Self { news, price }
    }

    /// Capabilities backed by NewsAPI and Alpha Vantage.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let news_client = NewsApiClient::new(config.news_api_key.clone())?;
        let price_client = AlphaVantageClient::new(config.alpha_vantage_api_key.clone())?;

        Ok(Self::new(
            Arc::new(NewsLookup::new(Arc::new(news_client))),
            Arc::new(PriceLookup::new(Arc::new(price_client))),
        ))
    }

    pub fn get(&self, kind: CapabilityKind) -> &dyn Capability {
        match kind {
            CapabilityKind::NewsLookup => self.news.as_ref(),
            CapabilityKind::PriceLookup => self.price.as_ref(),
        }
    }

    /// Capabilities in the order the model should consider them.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Capability> {
        CapabilityKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    pub fn names(&self) -> Vec<&'static str> {
        CapabilityKind::ALL.iter().map(|kind| kind.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{article, StubNews, StubPrices};

    fn stub_set(news: Arc<StubNews>, prices: Arc<StubPrices>) -> CapabilitySet {
        CapabilitySet::new(
            Arc::new(NewsLookup::new(news)),
            Arc::new(PriceLookup::new(prices)),
        )
    }

    #[tokio::test]
    async fn test_second_invocation_is_exhausted_without_provider_call() {
        let news = Arc::new(StubNews::with_articles(vec![article(
            "Apple beats estimates",
            "Reuters",
            Some("Revenue rose."),
        )]));
        let prices = Arc::new(StubPrices::with_latest("AAPL"));
        let set = stub_set(news.clone(), prices.clone());
        let mut budget = CallBudget::default();

        let first = set.get(CapabilityKind::NewsLookup).invoke("Apple", &mut budget).await;
        let second = set.get(CapabilityKind::NewsLookup).invoke("Apple", &mut budget).await;

        assert!(matches!(first, Invocation::Completed(_)));
        assert_eq!(
            second,
            Invocation::Exhausted(news::NEWS_EXHAUSTED.to_string())
        );
        assert_eq!(news.call_count(), 1);
    }

    #[tokio::test]
    async fn test_budgets_are_per_capability() {
        let news = Arc::new(StubNews::with_articles(vec![]));
        let prices = Arc::new(StubPrices::with_latest("AAPL"));
        let set = stub_set(news.clone(), prices.clone());
        let mut budget = CallBudget::default();

        set.get(CapabilityKind::NewsLookup).invoke("Apple", &mut budget).await;
        let price = set.get(CapabilityKind::PriceLookup).invoke("AAPL", &mut budget).await;
        let again = set.get(CapabilityKind::PriceLookup).invoke("AAPL", &mut budget).await;

        assert!(price.observation().starts_with("Data for AAPL"));
        assert_eq!(again.observation(), price::PRICE_EXHAUSTED);
        assert_eq!(prices.call_count(), 1);
    }

    #[test]
    fn test_iteration_order_puts_news_first() {
        let set = stub_set(
            Arc::new(StubNews::with_articles(vec![])),
            Arc::new(StubPrices::with_latest("SPY")),
        );
        let kinds: Vec<_> = set.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![CapabilityKind::NewsLookup, CapabilityKind::PriceLookup]);
        assert_eq!(set.names(), vec!["news_lookup", "price_lookup"]);
    }
}
