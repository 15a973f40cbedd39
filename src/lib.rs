//! Market Query Agent
//!
//! Answers a natural-language financial question by letting a language
//! model drive a bounded tool-calling loop over two capabilities:
//! - news lookup (financial press, with one broadened retry)
//! - intraday price lookup (ticker or market index)
//!
//! Each capability may be called once per request. The loop is capped by
//! iteration count and wall-clock time, and always yields an answer.
//!
//! LOOP:
//! QUERY → THINK → SELECT CAPABILITY → OBSERVE → THINK ... → FINAL ANSWER

pub mod agent;
pub mod api;
pub mod budget;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod providers;

#[cfg(test)]
mod testing;

pub use error::Result;

// Re-export common types
pub use agent::ReasoningAgent;
pub use config::{AgentConfig, AgentSettings};
pub use models::*;
