//! The canonical request data model: one queued chat job and the message
//! types it is built from. This is the payload that crosses the wire to
//! Redis as a self-describing JSON string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// One part of a multimodal message's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content: either a plain string or an ordered sequence of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<Part>),
}

impl Content {
    /// Whether any part of this content is an image reference.
    pub fn has_image(&self) -> bool {
        match self {
            Content::Text(_) => false,
            Content::Parts(parts) => parts.iter().any(|p| matches!(p, Part::ImageUrl { .. })),
        }
    }

    /// The last plain-text fragment, used for text-length based detection.
    pub fn last_text(&self) -> String {
        match self {
            Content::Text(t) => t.clone(),
            Content::Parts(parts) => parts
                .iter()
                .rev()
                .find_map(|p| match p {
                    Part::Text { text } => Some(text.clone()),
                    _ => None,
                })
                .unwrap_or_default(),
        }
    }
}

/// A tool/function call emitted by an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_tool_call_type")]
    pub kind: String,
    pub function: ToolCallFunction,
}

fn default_tool_call_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    /// JSON-encoded argument string, round-tripped without reparsing where possible.
    pub arguments: String,
}

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Present on tool-role messages: the name of the tool that produced this content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Present on tool-role messages: the id of the tool call this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A file attachment referenced by the legacy `files` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Other,
}

/// The tool schema passed through unchanged to providers that support it.
pub type ToolSchema = serde_json::Value;

/// One queued unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub request_id: String,
    pub tenant_id: String,
    pub provider: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileDescriptor>>,
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_user: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Job {
    /// Whether any file attachment or inline content part is an image.
    pub fn has_image(&self) -> bool {
        let files_have_image = self
            .files
            .as_ref()
            .map(|files| files.iter().any(|f| f.kind == FileKind::Image))
            .unwrap_or(false);
        let messages_have_image = self.messages.iter().any(|m| {
            m.content
                .as_ref()
                .map(Content::has_image)
                .unwrap_or(false)
        });
        files_have_image || messages_have_image
    }

    pub fn has_pdf(&self) -> bool {
        self.files
            .as_ref()
            .map(|files| files.iter().any(|f| f.kind == FileKind::Pdf))
            .unwrap_or(false)
    }

    pub fn has_files(&self) -> bool {
        self.files.as_ref().map(|f| !f.is_empty()).unwrap_or(false)
    }

    /// The content of the last user message, used for text-length detection.
    pub fn last_user_text(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.as_ref())
            .map(Content::last_text)
            .unwrap_or_default()
    }

    /// Whether this job is tagged low-priority for ticket classification (§4.6).
    pub fn is_low_priority(&self) -> bool {
        self.category
            .as_deref()
            .map(|c| c.to_lowercase() == "low")
            .unwrap_or(false)
    }
}
