//! Language model seam
//!
//! The reasoning loop only needs "prompt in, text out". Gemini is the
//! production implementation; tests script their own.

use crate::Result;
use async_trait::async_trait;
use serde::Serialize;

pub mod gemini;
pub use gemini::GeminiClient;

/// A single completion request: fixed instructions plus the evolving
/// question-and-trace transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}
