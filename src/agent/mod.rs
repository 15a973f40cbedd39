//! Reasoning loop driver
//!
//! THINKING → AWAITING OBSERVATION → THINKING ... → TERMINAL | ABORTED
//!
//! Each request gets its own call budget and trace. The loop is strictly
//! sequential: one model call, then at most one capability call, then back
//! to the model. The whole loop runs under a single wall-clock timeout.

use crate::budget::CallBudget;
use crate::capabilities::{CapabilitySet, Invocation};
use crate::config::{AgentConfig, AgentSettings};
use crate::extractor::extract_answer;
use crate::llm::{GeminiClient, LanguageModel};
use crate::models::{
    AbortReason, AgentRun, CapabilityKind, ModelAction, Query, ReasoningStep, Termination,
};
use crate::Result;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub mod parser;
pub mod prompt;

use parser::parse_model_output;
use prompt::{build_prompt, PARSE_CORRECTION};

enum LoopState {
    Thinking,
    AwaitingObservation { name: String, argument: String },
    Terminal(String),
    Aborted(AbortReason),
}

pub struct ReasoningAgent {
    model: Box<dyn LanguageModel>,
    capabilities: CapabilitySet,
    settings: AgentSettings,
}

impl ReasoningAgent {
    pub fn new(
        model: Box<dyn LanguageModel>,
        capabilities: CapabilitySet,
        settings: AgentSettings,
    ) -> Self {
        Self {
            model,
            capabilities,
            settings,
        }
    }

    /// Gemini-backed agent with NewsAPI and Alpha Vantage capabilities.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let model = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
        let capabilities = CapabilitySet::from_config(config)?;

        Ok(Self::new(
            Box::new(model),
            capabilities,
            config.settings.clone(),
        ))
    }

    /// Answer one query. Only model transport failures surface as `Err`;
    /// everything else ends in an `AgentOutcome`.
    pub async fn run(&self, query: &Query) -> Result<AgentRun> {
        let request_id = Uuid::new_v4();
        let span = info_span!("agent_run", %request_id);

        async move {
            let start_time = Instant::now();
            let mut budget = CallBudget::new(self.settings.call_quota);
            let mut trace = Vec::new();

            info!(query = %query, "Agent: starting reasoning loop");

            let bounded = tokio::time::timeout(
                self.settings.timeout,
                self.drive(query, &mut budget, &mut trace),
            )
            .await;

            let termination = match bounded {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        timeout_ms = self.settings.timeout.as_millis() as u64,
                        steps = trace.len(),
                        "Reasoning loop timed out"
                    );
                    Termination::Aborted {
                        reason: AbortReason::Timeout,
                    }
                }
            };

            let outcome = extract_answer(&termination, &trace);
            let execution_time_ms = start_time.elapsed().as_millis() as u64;

            info!(
                steps = trace.len(),
                aborted = outcome.is_aborted(),
                execution_time_ms,
                "Agent: reasoning loop finished"
            );

            Ok(AgentRun {
                outcome,
                trace,
                execution_time_ms,
            })
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        query: &Query,
        budget: &mut CallBudget,
        trace: &mut Vec<ReasoningStep>,
    ) -> Result<Termination> {
        let mut state = LoopState::Thinking;
        let mut iterations = 0u32;
        let mut consecutive_parse_failures = 0u32;

        loop {
            state = match state {
                LoopState::Thinking => {
                    if iterations >= self.settings.max_iterations {
                        warn!(iterations, "Iteration limit reached without a final answer");
                        LoopState::Aborted(AbortReason::MaxIterations)
                    } else {
                        iterations += 1;
                        let prompt = build_prompt(query, &self.capabilities, trace);
                        let output = self.model.complete(&prompt).await?;

                        match parse_model_output(&output) {
                            ModelAction::FinalAnswer { text } => {
                                debug!(iteration = iterations, "Model produced a final answer");
                                trace.push(ReasoningStep::FinalAnswer { text: text.clone() });
                                LoopState::Terminal(text)
                            }
                            ModelAction::CapabilitySelection { name, argument } => {
                                consecutive_parse_failures = 0;
                                debug!(
                                    iteration = iterations,
                                    capability = %name,
                                    argument = %argument,
                                    "Model selected a capability"
                                );
                                LoopState::AwaitingObservation { name, argument }
                            }
                            ModelAction::Unparseable { raw } => {
                                consecutive_parse_failures += 1;
                                warn!(
                                    iteration = iterations,
                                    attempt = consecutive_parse_failures,
                                    "Model output could not be parsed"
                                );
                                trace.push(ReasoningStep::ParseFailure {
                                    raw,
                                    observation: PARSE_CORRECTION.to_string(),
                                });

                                if consecutive_parse_failures > self.settings.parse_retries {
                                    LoopState::Aborted(AbortReason::Unparseable)
                                } else {
                                    LoopState::Thinking
                                }
                            }
                        }
                    }
                }

                LoopState::AwaitingObservation { name, argument } => {
                    let step = self.observe(&name, argument, budget).await;
                    debug!(step = %step, "Observation recorded");
                    trace.push(step);
                    LoopState::Thinking
                }

                LoopState::Terminal(answer) => return Ok(Termination::Terminal { answer }),

                LoopState::Aborted(reason) => return Ok(Termination::Aborted { reason }),
            };
        }
    }

    async fn observe(&self, name: &str, argument: String, budget: &mut CallBudget) -> ReasoningStep {
        let Some(kind) = CapabilityKind::from_name(name) else {
            warn!(capability = %name, "Model selected an unknown capability");
            let observation = format!(
                "{} is not a valid capability, try one of [{}].",
                name,
                self.capabilities.names().join(", ")
            );
            return ReasoningStep::UnknownCapability {
                name: name.to_string(),
                argument,
                observation,
            };
        };

        match self.capabilities.get(kind).invoke(&argument, budget).await {
            Invocation::Completed(observation) => ReasoningStep::Observed {
                capability: kind,
                argument,
                observation,
            },
            Invocation::Exhausted(observation) => ReasoningStep::BudgetExhausted {
                capability: kind,
                argument,
                observation,
            },
        }
    }
}
