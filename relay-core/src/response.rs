//! The canonical response shape every provider adapter must produce.

use serde::{Deserialize, Serialize};

use crate::job::ToolCall;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalResponse {
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl CanonicalResponse {
    pub fn text(role: impl Into<String>, content: impl Into<String>, usage: Usage) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    role: role.into(),
                    content: Some(content.into()),
                    tool_calls: None,
                },
            }],
            usage,
        }
    }

    pub fn tool_calls(role: impl Into<String>, tool_calls: Vec<ToolCall>, usage: Usage) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    role: role.into(),
                    content: None,
                    tool_calls: Some(tool_calls),
                },
            }],
            usage,
        }
    }

    /// The fixed placeholder used when a Gemini candidate was suppressed by
    /// a safety filter. A successful, non-error response (§4.2, §7).
    pub const SAFETY_BLOCKED_PLACEHOLDER: &'static str =
        "⚠️ I cannot answer this due to safety filters.";
}
