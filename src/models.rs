//! Core data models for the market query agent
//!
//! Everything here is request-scoped: created when a query arrives and
//! dropped once the answer has been produced.

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Query =================
//

/// The user's free-text question. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ================= Capabilities =================
//

/// The fixed set of external actions the reasoning loop may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    NewsLookup,
    PriceLookup,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 2] = [CapabilityKind::NewsLookup, CapabilityKind::PriceLookup];

    /// Name the model uses to select this capability.
    pub fn name(&self) -> &'static str {
        match self {
            CapabilityKind::NewsLookup => "news_lookup",
            CapabilityKind::PriceLookup => "price_lookup",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//
// ================= Model Output =================
//

/// What the language model asked for on one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAction {
    CapabilitySelection { name: String, argument: String },
    FinalAnswer { text: String },
    Unparseable { raw: String },
}

//
// ================= Trace =================
//

/// One cycle of the reasoning loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReasoningStep {
    /// The capability ran and produced an observation.
    Observed {
        capability: CapabilityKind,
        argument: String,
        observation: String,
    },
    /// The capability was selected after its quota ran out; no provider call was made.
    BudgetExhausted {
        capability: CapabilityKind,
        argument: String,
        observation: String,
    },
    /// The model named something outside the capability set.
    UnknownCapability {
        name: String,
        argument: String,
        observation: String,
    },
    /// The model output matched neither grammar.
    ParseFailure { raw: String, observation: String },
    /// The model designated its answer as final.
    FinalAnswer { text: String },
}

impl ReasoningStep {
    pub fn observation(&self) -> Option<&str> {
        match self {
            ReasoningStep::Observed { observation, .. }
            | ReasoningStep::BudgetExhausted { observation, .. }
            | ReasoningStep::UnknownCapability { observation, .. }
            | ReasoningStep::ParseFailure { observation, .. } => Some(observation),
            ReasoningStep::FinalAnswer { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReasoningStep::FinalAnswer { .. })
    }

    /// True only when an external provider was actually called.
    pub fn invoked_capability(&self) -> Option<CapabilityKind> {
        match self {
            ReasoningStep::Observed { capability, .. } => Some(*capability),
            _ => None,
        }
    }
}

impl fmt::Display for ReasoningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningStep::Observed { capability, argument, observation } => {
                write!(f, "{}({:?}) -> {}", capability, argument, observation)
            }
            ReasoningStep::BudgetExhausted { capability, argument, observation } => {
                write!(f, "{}({:?}) [quota spent] -> {}", capability, argument, observation)
            }
            ReasoningStep::UnknownCapability { name, argument, observation } => {
                write!(f, "{}({:?}) [unknown] -> {}", name, argument, observation)
            }
            ReasoningStep::ParseFailure { observation, .. } => {
                write!(f, "unparseable output -> {}", observation)
            }
            ReasoningStep::FinalAnswer { text } => write!(f, "final answer: {}", text),
        }
    }
}

//
// ================= Outcome =================
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    MaxIterations,
    Timeout,
    Unparseable,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbortReason::MaxIterations => "iteration limit reached",
            AbortReason::Timeout => "timed out",
            AbortReason::Unparseable => "model output could not be parsed",
        };
        f.write_str(s)
    }
}

/// How the reasoning loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Terminal { answer: String },
    Aborted { reason: AbortReason },
}

/// The answer handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentOutcome {
    Answered { answer: String },
    Aborted { reason: AbortReason, answer: String },
}

impl AgentOutcome {
    pub fn answer(&self) -> &str {
        match self {
            AgentOutcome::Answered { answer } | AgentOutcome::Aborted { answer, .. } => answer,
        }
    }

    pub fn into_answer(self) -> String {
        match self {
            AgentOutcome::Answered { answer } | AgentOutcome::Aborted { answer, .. } => answer,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, AgentOutcome::Aborted { .. })
    }
}

/// Full result of one request: the extracted outcome and the trace behind it.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    pub outcome: AgentOutcome,
    pub trace: Vec<ReasoningStep>,
    pub execution_time_ms: u64,
}
