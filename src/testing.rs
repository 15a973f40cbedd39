//! Test doubles for the model and the data providers

use crate::error::AgentError;
use crate::llm::{LanguageModel, Prompt};
use crate::providers::{Article, ArticleSource, IntradayProvider, IntradaySeries, NewsProvider, NewsSearch};
use crate::Result;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub fn article(title: &str, source: &str, description: Option<&str>) -> Article {
    Article {
        title: Some(title.to_string()),
        description: description.map(str::to_string),
        source: ArticleSource {
            id: None,
            name: Some(source.to_string()),
        },
    }
}

/// A structured-chat action blob as the model would write it.
pub fn action(name: &str, input: &str) -> String {
    format!(
        "Thought: next step\nAction:\n```json\n{}\n```",
        json!({ "action": name, "action_input": input })
    )
}

pub fn final_answer(text: &str) -> String {
    action("Final Answer", text)
}

//
// ================= News =================
//

pub enum StubReply {
    Articles(Vec<Article>),
    Fail(String),
}

/// Replies in order; once the script runs out every search returns nothing.
pub struct StubNews {
    replies: Mutex<VecDeque<StubReply>>,
    searches: Mutex<Vec<NewsSearch>>,
}

impl StubNews {
    pub fn new(replies: Vec<StubReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self::new(vec![StubReply::Articles(articles)])
    }

    pub fn searches(&self) -> Vec<NewsSearch> {
        self.searches.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

#[async_trait]
impl NewsProvider for StubNews {
    async fn search(&self, request: &NewsSearch) -> Result<Vec<Article>> {
        self.searches.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(StubReply::Articles(articles)) => Ok(articles),
            Some(StubReply::Fail(message)) => Err(AgentError::ProviderError(message)),
            None => Ok(Vec::new()),
        }
    }
}

//
// ================= Prices =================
//

enum PriceReply {
    Series(IntradaySeries),
    Status(u16),
    Fail(String),
}

pub struct StubPrices {
    reply: PriceReply,
    symbols: Mutex<Vec<String>>,
}

impl StubPrices {
    fn new(reply: PriceReply) -> Self {
        Self {
            reply,
            symbols: Mutex::new(Vec::new()),
        }
    }

    /// Two bars, the later one closing at 169.55.
    pub fn with_latest(symbol: &str) -> Self {
        let mut series = IntradaySeries::new();
        series.insert(
            "2024-05-01 15:55:00".into(),
            json!({ "1. open": "169.10", "4. close": "169.30", "symbol": symbol }),
        );
        series.insert(
            "2024-05-01 16:00:00".into(),
            json!({ "1. open": "169.30", "4. close": "169.55", "symbol": symbol }),
        );
        Self::new(PriceReply::Series(series))
    }

    pub fn with_series(series: IntradaySeries) -> Self {
        Self::new(PriceReply::Series(series))
    }

    pub fn with_status(status: u16) -> Self {
        Self::new(PriceReply::Status(status))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(PriceReply::Fail(message.to_string()))
    }

    pub fn symbols(&self) -> Vec<String> {
        self.symbols.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.symbols.lock().unwrap().len()
    }
}

#[async_trait]
impl IntradayProvider for StubPrices {
    async fn intraday(&self, symbol: &str) -> Result<IntradaySeries> {
        self.symbols.lock().unwrap().push(symbol.to_string());
        match &self.reply {
            PriceReply::Series(series) => Ok(series.clone()),
            PriceReply::Status(status) => Err(AgentError::ProviderStatus(*status)),
            PriceReply::Fail(message) => Err(AgentError::ProviderError(message.clone())),
        }
    }
}

//
// ================= Model =================
//

type Responder = Box<dyn Fn(&Prompt, usize) -> String + Send + Sync>;

/// Language model driven by a script or a closure over the prompt.
pub struct ScriptedModel {
    outputs: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    /// Returns each output once, then fails like a transport error.
    pub fn new(outputs: Vec<String>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            repeat: None,
            responder: None,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the same output forever.
    pub fn repeating(output: String) -> Self {
        Self {
            repeat: Some(output),
            ..Self::new(Vec::new())
        }
    }

    /// `respond(prompt, call_index)` computes each output.
    pub fn responding<F>(respond: F) -> Self
    where
        F: Fn(&Prompt, usize) -> String + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(respond)),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let call_index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len() - 1
        };

        if let Some(respond) = &self.responder {
            return Ok(respond(prompt, call_index));
        }
        if let Some(output) = self.outputs.lock().unwrap().pop_front() {
            return Ok(output);
        }
        self.repeat
            .clone()
            .ok_or_else(|| AgentError::LlmError("script exhausted".to_string()))
    }
}

/// Model whose completion panics, for exercising the outermost boundary.
pub struct PanickingModel;

#[async_trait]
impl LanguageModel for PanickingModel {
    async fn complete(&self, _prompt: &Prompt) -> Result<String> {
        panic!("model client bug");
    }
}

//
// ================= HTTP =================
//

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Decoded query parameters received by a local server, in arrival order.
#[derive(Clone, Default)]
pub struct SeenQueries(std::sync::Arc<Mutex<Vec<HashMap<String, String>>>>);

impl SeenQueries {
    pub fn record(&self, params: HashMap<String, String>) {
        self.0.lock().unwrap().push(params);
    }

    pub fn all(&self) -> Vec<HashMap<String, String>> {
        self.0.lock().unwrap().clone()
    }
}
