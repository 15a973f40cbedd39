//! Parsing model output into a `ModelAction`
//!
//! Accepted shapes, in order: a JSON blob with `action`/`action_input`
//! (fenced or bare), then a ReAct-style `Final Answer:` line. Anything else
//! is `Unparseable`.

use super::prompt::FINAL_ANSWER_ACTION;
use crate::models::ModelAction;
use serde_json::Value;

pub fn parse_model_output(output: &str) -> ModelAction {
    if let Some(blob) = extract_json_blob(output) {
        if let Some(action) = action_from_blob(&blob) {
            return action;
        }
    }

    if let Some(text) = final_answer_line(output) {
        return ModelAction::FinalAnswer { text };
    }

    ModelAction::Unparseable {
        raw: output.to_string(),
    }
}

/// Fenced ```json block first, then the outermost `{ ... }` span.
fn extract_json_blob(output: &str) -> Option<Value> {
    if let Some(start) = output.find("```") {
        let after_fence = &output[start + 3..];
        let body_start = after_fence.find('\n').unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            if let Ok(parsed) = serde_json::from_str::<Value>(body[..end].trim()) {
                return Some(parsed);
            }
        }
    }

    let brace_start = output.find('{')?;
    let brace_end = output.rfind('}')?;
    if brace_end <= brace_start {
        return None;
    }
    serde_json::from_str(&output[brace_start..=brace_end]).ok()
}

fn action_from_blob(blob: &Value) -> Option<ModelAction> {
    let name = blob.get("action")?.as_str()?.trim();
    let input = input_text(blob.get("action_input")?)?;

    if name.is_empty() {
        return None;
    }

    if name.eq_ignore_ascii_case(FINAL_ANSWER_ACTION) {
        if input.trim().is_empty() {
            return None;
        }
        return Some(ModelAction::FinalAnswer { text: input });
    }

    Some(ModelAction::CapabilitySelection {
        name: name.to_string(),
        argument: input,
    })
}

/// Models sometimes wrap the input in an object such as `{"query": "AAPL"}`.
fn input_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(input_text),
        other => Some(other.to_string()),
    }
}

fn final_answer_line(output: &str) -> Option<String> {
    let marker = format!("{}:", FINAL_ANSWER_ACTION);
    let start = output.find(&marker)? + marker.len();
    let text = output[start..].trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_capability_selection() {
        let output = "Thought: check news\nAction:\n```json\n{\"action\": \"news_lookup\", \"action_input\": \"Apple\"}\n```";
        assert_eq!(
            parse_model_output(output),
            ModelAction::CapabilitySelection {
                name: "news_lookup".into(),
                argument: "Apple".into()
            }
        );
    }

    #[test]
    fn test_bare_final_answer_blob() {
        let output = r#"{"action": "Final Answer", "action_input": "AAPL is trading at $169.55."}"#;
        assert_eq!(
            parse_model_output(output),
            ModelAction::FinalAnswer {
                text: "AAPL is trading at $169.55.".into()
            }
        );
    }

    #[test]
    fn test_object_input_is_unwrapped() {
        let output = r#"{"action": "price_lookup", "action_input": {"symbol": "MSFT"}}"#;
        assert_eq!(
            parse_model_output(output),
            ModelAction::CapabilitySelection {
                name: "price_lookup".into(),
                argument: "MSFT".into()
            }
        );
    }

    #[test]
    fn test_react_final_answer_line() {
        let output = "Thought: I know the answer\nFinal Answer: Markets are flat today.";
        assert_eq!(
            parse_model_output(output),
            ModelAction::FinalAnswer {
                text: "Markets are flat today.".into()
            }
        );
    }

    #[test]
    fn test_unparseable_outputs() {
        for output in [
            "I think Apple is doing fine.",
            "```json\n{\"action\": \"news_lookup\"}\n```",
            r#"{"action": "Final Answer", "action_input": "  "}"#,
            "{ not json }",
            "",
        ] {
            assert!(
                matches!(parse_model_output(output), ModelAction::Unparseable { .. }),
                "expected unparseable: {:?}",
                output
            );
        }
    }
}
