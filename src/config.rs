//! Environment-driven configuration
//!
//! Call `dotenv::dotenv()` before `AgentConfig::from_env()` to pick up a
//! local `.env` file.

use crate::budget::DEFAULT_CALL_QUOTA;
use crate::error::AgentError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MAX_ITERATIONS: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PORT: u16 = 8080;

/// Loop limits used by the reasoning agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_iterations: u32,
    pub timeout: Duration,
    pub call_quota: u32,
    /// Consecutive unparseable model outputs tolerated before aborting.
    pub parse_retries: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            call_quota: DEFAULT_CALL_QUOTA,
            parse_retries: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub news_api_key: String,
    pub alpha_vantage_api_key: String,
    pub port: u16,
    pub settings: AgentSettings,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let settings = AgentSettings {
            max_iterations: parse_var("AGENT_MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS)?,
            timeout: Duration::from_secs(parse_var("AGENT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            call_quota: parse_var("AGENT_CALL_QUOTA", DEFAULT_CALL_QUOTA)?,
            ..AgentSettings::default()
        };

        let port = match env::var("PORT").or_else(|_| env::var("API_PORT")) {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                AgentError::ConfigError(format!("PORT must be a port number, got {:?}", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            gemini_api_key: key_var("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            news_api_key: key_var("NEWS_API_KEY"),
            alpha_vantage_api_key: key_var("ALPHA_VANTAGE_API_KEY"),
            port,
            settings,
        })
    }
}

/// Missing keys are not fatal: the affected provider reports the failure as
/// an observation at request time.
fn key_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set; requests depending on it will fail", name);
        String::new()
    })
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AgentError::ConfigError(format!("{} has an invalid value: {:?}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}
