//! Intraday price lookup capability

use super::Capability;
use crate::error::AgentError;
use crate::models::CapabilityKind;
use crate::providers::IntradayProvider;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

pub const PRICE_EXHAUSTED: &str =
    "Stock data has already been retrieved. Use existing data for analysis.";
pub const NO_SYMBOLS: &str = "No specific stock symbols found to search";
pub const NO_DATA: &str = "No data";

/// Proxy used for questions about the broad market.
pub const INDEX_PROXY_TICKER: &str = "SPY";

lazy_static! {
    static ref TICKER: Regex = Regex::new(r"\b[A-Z]{1,5}\b").unwrap();
    static ref INDEX_REFERENCE: Regex = Regex::new(r"(?i)s&p|sp500|market").unwrap();
}

pub struct PriceLookup {
    provider: Arc<dyn IntradayProvider>,
}

impl PriceLookup {
    pub fn new(provider: Arc<dyn IntradayProvider>) -> Self {
        Self { provider }
    }
}

/// Index references win over any ticker-looking token.
pub fn resolve_symbol(text: &str) -> Option<String> {
    if INDEX_REFERENCE.is_match(text) {
        return Some(INDEX_PROXY_TICKER.to_string());
    }
    TICKER.find(text).map(|m| m.as_str().to_string())
}

#[async_trait]
impl Capability for PriceLookup {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::PriceLookup
    }

    fn description(&self) -> &'static str {
        "Use this only when specific stock symbols are mentioned (like AAPL, GOOG) or when \
         analyzing market indices (S&P 500). Input: the ticker symbol in capitals, or the index name."
    }

    fn exhausted_message(&self) -> &'static str {
        PRICE_EXHAUSTED
    }

    async fn fetch(&self, argument: &str) -> String {
        let Some(symbol) = resolve_symbol(argument) else {
            debug!(argument, "No ticker symbol in price lookup input");
            return NO_SYMBOLS.to_string();
        };

        match self.provider.intraday(&symbol).await {
            Ok(series) => match series.iter().next_back() {
                Some((timestamp, bar)) => format!("Data for {} at {}: {}", symbol, timestamp, bar),
                None => NO_DATA.to_string(),
            },
            Err(AgentError::ProviderStatus(code)) => {
                warn!(symbol = %symbol, status = code, "Price provider returned an error status");
                format!("Error {}", code)
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Price lookup failed");
                format!("Error retrieving price data: {}", e.detail())
            }
        }
    }
}
