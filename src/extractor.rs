//! Answer extraction
//!
//! Turns the loop's termination plus its trace into the text returned to
//! the caller. Never fails: every path yields a non-empty answer.

use crate::models::{AgentOutcome, ReasoningStep, Termination};
use tracing::warn;

/// Shown whenever no usable answer exists.
pub const FALLBACK_ANSWER: &str =
    "Unable to process request. Please try again with a specific stock symbol or news query.";

pub fn extract_answer(termination: &Termination, trace: &[ReasoningStep]) -> AgentOutcome {
    let traced = latest_final_answer(trace);

    match termination {
        Termination::Terminal { answer } => {
            // The trace is authoritative when the two disagree
            let answer = match traced {
                Some(text) if text != answer.as_str() => {
                    warn!(
                        nominal = %answer,
                        traced = %text,
                        "Loop output differs from final answer in trace; using trace"
                    );
                    text
                }
                Some(text) => text,
                None => answer.as_str(),
            };

            if answer.trim().is_empty() {
                warn!("Final answer was empty; using fallback");
                return AgentOutcome::Answered {
                    answer: FALLBACK_ANSWER.to_string(),
                };
            }

            AgentOutcome::Answered {
                answer: answer.to_string(),
            }
        }
        Termination::Aborted { reason } => {
            let answer = match traced {
                Some(text) => {
                    warn!(%reason, "Loop aborted after a final answer was recorded; using it");
                    text.to_string()
                }
                None => FALLBACK_ANSWER.to_string(),
            };

            AgentOutcome::Aborted {
                reason: *reason,
                answer,
            }
        }
    }
}

fn latest_final_answer(trace: &[ReasoningStep]) -> Option<&str> {
    trace.iter().rev().find_map(|step| match step {
        ReasoningStep::FinalAnswer { text } if !text.trim().is_empty() => Some(text.as_str()),
        _ => None,
    })
}
