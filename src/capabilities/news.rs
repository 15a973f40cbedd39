//! News lookup capability
//!
//! Searches a fixed set of financial-press sources. If the targeted query
//! finds nothing, one broadened query is issued before giving up.

use super::Capability;
use crate::models::CapabilityKind;
use crate::providers::{Article, NewsProvider, NewsSearch};
use crate::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NEWS_EXHAUSTED: &str =
    "News has already been checked. Use existing data or proceed to stock analysis.";
pub const NO_NEWS: &str = "No recent news found";

const FINANCIAL_SOURCES: &[&str] = &[
    "reuters",
    "bloomberg",
    "cnbc",
    "business-insider",
    "financial-times",
    "the-wall-street-journal",
];
const PAGE_SIZE: u32 = 5;
const MAX_ENTRIES: usize = 3;

lazy_static! {
    // Innermost groups only, so nested brackets are peeled one layer per pass
    static ref BRACKETED: Regex = Regex::new(r"\[[^\[\]]*\]|\([^()]*\)").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

pub struct NewsLookup {
    provider: Arc<dyn NewsProvider>,
}

impl NewsLookup {
    pub fn new(provider: Arc<dyn NewsProvider>) -> Self {
        Self { provider }
    }

    /// Targeted query first, broadened query only when it comes back empty.
    async fn lookup(&self, topic: &str) -> Result<Vec<Article>> {
        let articles = self.provider.search(&primary_search(topic)).await?;
        if !articles.is_empty() {
            return Ok(articles);
        }

        info!(topic, "No articles for targeted query, broadening");
        self.provider.search(&fallback_search(topic)).await
    }
}

#[async_trait]
impl Capability for NewsLookup {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::NewsLookup
    }

    fn description(&self) -> &'static str {
        "ALWAYS use this first to get the latest financial news and identify relevant stock symbols. \
         Input: a company name or market topic."
    }

    fn exhausted_message(&self) -> &'static str {
        NEWS_EXHAUSTED
    }

    async fn fetch(&self, topic: &str) -> String {
        match self.lookup(topic.trim()).await {
            Ok(articles) if articles.is_empty() => NO_NEWS.to_string(),
            Ok(articles) => {
                debug!(count = articles.len(), "News articles retrieved");
                format_articles(&articles)
            }
            Err(e) => {
                warn!(error = %e, "News lookup failed");
                format!("Error retrieving news: {}", e.detail())
            }
        }
    }
}

fn search(query: String) -> NewsSearch {
    NewsSearch {
        query,
        sources: FINANCIAL_SOURCES.iter().map(|s| s.to_string()).collect(),
        language: "en".to_string(),
        page_size: PAGE_SIZE,
        sort_by: "relevancy".to_string(),
    }
}

fn primary_search(topic: &str) -> NewsSearch {
    search(format!("\"{}\" AND (company OR earnings OR stock)", topic))
}

fn fallback_search(topic: &str) -> NewsSearch {
    search(format!("{} AND (business OR finance OR technology)", topic))
}

/// Removes `[...]` and `(...)` groups, including nested ones.
fn strip_noise(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = BRACKETED.replace_all(&current, "").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    WHITESPACE.replace_all(current.trim(), " ").into_owned()
}

fn format_articles(articles: &[Article]) -> String {
    articles
        .iter()
        .filter_map(|article| article.title.as_deref().map(|title| (article, title)))
        .take(MAX_ENTRIES)
        .enumerate()
        .map(|(i, (article, title))| {
            let title = strip_noise(title);
            let source = article.source.name.as_deref().unwrap_or("unknown source");
            let description = article
                .description
                .as_deref()
                .map(strip_noise)
                .unwrap_or_default();

            if description.is_empty() {
                format!("{}. {} from {}", i + 1, title, source)
            } else {
                format!("{}. {} from {}: {}", i + 1, title, source, description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
