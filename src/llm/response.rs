// SPDX-License-Identifier: MIT

//! Response shapes and the total normalization function
//!
//! Providers return heterogeneous payloads. Rather than probing attributes
//! ad hoc, the known shapes are a closed union and `normalize` resolves any
//! of them to plain text. It is total: every input produces some string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A provider response in one of the known shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LlmResponse {
    /// The payload carries its text directly
    Direct { content: String },
    /// Completion envelope: a list of choices, each holding either a plain
    /// text field or a nested message with a content field
    Envelope { choices: Vec<Choice> },
    /// Anything else, kept verbatim
    Json(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

impl LlmResponse {
    pub fn direct(content: impl Into<String>) -> Self {
        Self::Direct {
            content: content.into(),
        }
    }
}

/// Resolve any response shape to trimmed text
///
/// Resolution order: direct content, the first choice's `text`, the first
/// choice's `message.content`, a top-level `content` field, and finally the
/// stringified value.
pub fn normalize(response: &LlmResponse) -> String {
    match response {
        LlmResponse::Direct { content } => content.trim().to_string(),
        LlmResponse::Envelope { choices } => match choices.first() {
            Some(choice) => normalize_choice(choice)
                .unwrap_or_else(|| stringify(&serde_json::json!({ "choices": choices }))),
            None => stringify(&serde_json::json!({ "choices": [] })),
        },
        LlmResponse::Json(value) => normalize_json(value),
    }
}

fn normalize_choice(choice: &Choice) -> Option<String> {
    if let Some(text) = &choice.text {
        return Some(text.trim().to_string());
    }
    choice
        .message
        .as_ref()
        .map(|m| m.content.trim().to_string())
}

fn normalize_json(value: &Value) -> String {
    if let Some(obj) = value.as_object() {
        if let Some(choices) = obj.get("choices").and_then(Value::as_array) {
            if let Some(first) = choices.first() {
                if let Some(text) = first.get("text").and_then(Value::as_str) {
                    return text.trim().to_string();
                }
                if let Some(content) = first
                    .get("message")
                    .and_then(|m| m.get("content"))
                    .and_then(Value::as_str)
                {
                    return content.trim().to_string();
                }
            }
        }
        if let Some(content) = obj.get("content").and_then(Value::as_str) {
            return content.trim().to_string();
        }
    }
    stringify(value)
}

/// String representation used as the last resort; plain strings are not quoted
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_content_trimmed() {
        let response = LlmResponse::direct("  summary text \n");
        assert_eq!(normalize(&response), "summary text");
    }

    #[test]
    fn test_envelope_choice_text() {
        let response = LlmResponse::Envelope {
            choices: vec![Choice {
                text: Some(" completion ".to_string()),
                message: None,
            }],
        };
        assert_eq!(normalize(&response), "completion");
    }

    #[test]
    fn test_envelope_message_content() {
        let response = LlmResponse::Envelope {
            choices: vec![Choice {
                text: None,
                message: Some(ChoiceMessage {
                    content: " chat reply ".to_string(),
                }),
            }],
        };
        assert_eq!(normalize(&response), "chat reply");
    }

    #[test]
    fn test_envelope_prefers_text_over_message() {
        let response = LlmResponse::Envelope {
            choices: vec![Choice {
                text: Some("text wins".to_string()),
                message: Some(ChoiceMessage {
                    content: "message loses".to_string(),
                }),
            }],
        };
        assert_eq!(normalize(&response), "text wins");
    }

    #[test]
    fn test_empty_envelope_stringifies() {
        let response = LlmResponse::Envelope { choices: vec![] };
        let out = normalize(&response);
        assert!(out.contains("choices"));
    }

    #[test]
    fn test_json_envelope_shape() {
        let response = LlmResponse::Json(json!({
            "choices": [{"message": {"role": "assistant", "content": " nested "}}]
        }));
        assert_eq!(normalize(&response), "nested");
    }

    #[test]
    fn test_json_top_level_content() {
        let response = LlmResponse::Json(json!({"content": " plain mapping "}));
        assert_eq!(normalize(&response), "plain mapping");
    }

    #[test]
    fn test_json_string_not_quoted() {
        let response = LlmResponse::Json(json!("  bare string  "));
        assert_eq!(normalize(&response), "bare string");
    }

    #[test]
    fn test_unrecognized_shape_never_fails() {
        for value in [json!(null), json!(42), json!([1, 2]), json!({"other": true})] {
            let out = normalize(&LlmResponse::Json(value.clone()));
            assert_eq!(out, value.to_string());
        }
    }
}
