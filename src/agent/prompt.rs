//! Prompt construction for the reasoning loop

use crate::capabilities::CapabilitySet;
use crate::llm::Prompt;
use crate::models::{Query, ReasoningStep};
use serde_json::json;

pub const FINAL_ANSWER_ACTION: &str = "Final Answer";

/// Longest slice of an unparseable reply echoed back into the transcript.
const MAX_ECHOED_OUTPUT: usize = 500;

const ANALYST_POLICY: &str = r#"You are a financial analyst answering questions about companies and markets.

FOR EVERY COMPANY QUESTION:
- FIRST use news_lookup to get the latest news about that specific company.
- THEN use price_lookup to get current price data for that company.
- Use the company's official ticker symbol, e.g. "GOOG" for Google, never "GOOGLE".
- If no relevant news was found, say so clearly.
- If no price data was found, say so clearly.
- Do not include unrelated news or connect the company to unrelated events.

EVERY ANSWER MUST CONTAIN:
- The latest price, only if price data was actually retrieved.
- Only news that directly concerns the company in question.
- A clear statement when either news or price data is missing.

ANSWER FORMAT:
- Both found: "[Company] is currently trading at $X.XX [price movement]. Recent company-specific news indicates [summary of directly related news]."
- No relevant news: "[Company] is currently trading at $X.XX [price movement]. No significant company-specific news was found in the recent period."
- No price data: "Unable to retrieve current stock data for [Company]. [Any directly related news]."

QUALITY CHECKS:
- Never mention other companies unless they directly involve the queried one.
- Never speculate about links between general industry news and the company.
- If the articles are not about the company, say "No recent company-specific news found".
- Never show placeholder prices."#;

const FORMAT_INSTRUCTIONS: &str = r#"Reply with exactly ONE action as a JSON blob inside a ```json fence:

```json
{
  "action": "<capability name or \"Final Answer\">",
  "action_input": "<input for the capability, or your final answer>"
}
```

Work in this cycle:
Question: the question to answer
Thought: what to do next
Action: one JSON blob as above
Observation: the result of the action
... (Thought/Action/Observation repeats as needed)
Thought: I know what to respond
Action:
```json
{
  "action": "Final Answer",
  "action_input": "the answer for the user"
}
```

Each capability can be used once per question. Stop after the action; the
observation will be supplied to you."#;

pub const PARSE_CORRECTION: &str = "Invalid or incomplete response. Reply with exactly one JSON action blob \
with \"action\" and \"action_input\" keys, or use \"Final Answer\" to finish.";

pub fn build_prompt(query: &Query, capabilities: &CapabilitySet, trace: &[ReasoningStep]) -> Prompt {
    Prompt {
        system: system_prompt(capabilities),
        user: transcript(query, trace),
    }
}

fn system_prompt(capabilities: &CapabilitySet) -> String {
    let tool_lines: Vec<String> = capabilities
        .iter()
        .map(|capability| format!("{}: {}", capability.kind().name(), capability.description()))
        .collect();

    format!(
        "{}\n\nYou have access to the following capabilities:\n\n{}\n\nValid \"action\" values: {} or \"{}\".\n\n{}",
        ANALYST_POLICY,
        tool_lines.join("\n"),
        capabilities
            .names()
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", "),
        FINAL_ANSWER_ACTION,
        FORMAT_INSTRUCTIONS,
    )
}

fn transcript(query: &Query, trace: &[ReasoningStep]) -> String {
    let mut out = format!("Question: {}\n\n", query);

    for step in trace {
        match step {
            ReasoningStep::Observed { capability, argument, observation }
            | ReasoningStep::BudgetExhausted { capability, argument, observation } => {
                push_exchange(&mut out, &action_blob(capability.name(), argument), observation);
            }
            ReasoningStep::UnknownCapability { name, argument, observation } => {
                push_exchange(&mut out, &action_blob(name, argument), observation);
            }
            ReasoningStep::ParseFailure { raw, observation } => {
                push_exchange(&mut out, &truncate(raw, MAX_ECHOED_OUTPUT), observation);
            }
            ReasoningStep::FinalAnswer { .. } => {}
        }
    }

    out.push_str("Reminder: reply with exactly one JSON action blob. Use \"Final Answer\" once you can answer.\nThought:");
    out
}

fn push_exchange(out: &mut String, action: &str, observation: &str) {
    out.push_str("Action:\n");
    out.push_str(action);
    out.push_str("\nObservation: ");
    out.push_str(observation);
    out.push_str("\n\n");
}

fn action_blob(name: &str, argument: &str) -> String {
    format!(
        "```json\n{}\n```",
        json!({ "action": name, "action_input": argument })
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{NewsLookup, PriceLookup};
    use crate::models::CapabilityKind;
    use crate::testing::{StubNews, StubPrices};
    use std::sync::Arc;

    fn capabilities() -> CapabilitySet {
        CapabilitySet::new(
            Arc::new(NewsLookup::new(Arc::new(StubNews::with_articles(vec![])))),
            Arc::new(PriceLookup::new(Arc::new(StubPrices::with_latest("AAPL")))),
        )
    }

    #[test]
    fn test_system_prompt_lists_capabilities_and_policy() {
        let prompt = build_prompt(&Query::new("How is Apple doing?"), &capabilities(), &[]);

        assert!(prompt.system.contains("news_lookup: ALWAYS use this first"));
        assert!(prompt.system.contains("price_lookup: Use this only when"));
        assert!(prompt.system.contains("\"GOOG\" for Google"));
        assert!(prompt.system.contains("\"Final Answer\""));
        assert!(prompt.user.starts_with("Question: How is Apple doing?"));
    }

    #[test]
    fn test_transcript_replays_trace_in_order() {
        let trace = vec![
            ReasoningStep::Observed {
                capability: CapabilityKind::NewsLookup,
                argument: "Apple".into(),
                observation: "1. Apple beats estimates from Reuters".into(),
            },
            ReasoningStep::BudgetExhausted {
                capability: CapabilityKind::NewsLookup,
                argument: "Apple".into(),
                observation: "News has already been checked.".into(),
            },
        ];

        let prompt = build_prompt(&Query::new("Apple?"), &capabilities(), &trace);
        let first = prompt.user.find("Apple beats estimates").unwrap();
        let second = prompt.user.find("News has already been checked.").unwrap();

        assert!(first < second);
        assert!(prompt.user.contains(r#""action":"news_lookup""#));
        assert!(prompt.user.ends_with("Thought:"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("short", 10), "short");
    }
}
