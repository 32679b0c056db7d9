//! The OpenAI-style adapter (§4.2).

use relay_core::job::{Content, FileKind, Part, Role, ToolCall, ToolCallFunction};
use relay_core::{CanonicalResponse, ChoiceMessage, Message, Usage};
use serde_json::{json, Value};

use crate::common::{ensure_success, http_err, SHARED_HTTP_CLIENT};
use crate::error::{ProviderError, ProviderResult};

const CHAT_MODEL: &str = "gpt-4o-mini";
const VISION_MODEL: &str = "gpt-4o";
const NAME: &str = "openai";

pub struct OpenAiAdapter {
    api_key: String,
    base_url: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Chooses a vision-capable model when any file is an image OR any
    /// message content is a sequence containing an image-URL part.
    fn model_for(&self, has_image: bool) -> &'static str {
        if has_image {
            VISION_MODEL
        } else {
            CHAT_MODEL
        }
    }

    pub async fn invoke(
        &self,
        messages: &[Message],
        has_image: bool,
        temperature: f32,
        tools: Option<&[Value]>,
        tool_choice: Option<&Value>,
    ) -> ProviderResult<CanonicalResponse> {
        let wire_messages: Vec<Value> = messages.iter().map(message_to_wire).collect();

        let mut body = json!({
            "model": self.model_for(has_image),
            "messages": wire_messages,
            "temperature": temperature,
        });

        if let Some(tools) = tools {
            body["tools"] = json!(tools);
        }
        if let Some(choice) = tool_choice {
            body["tool_choice"] = choice.clone();
        }

        self.chat(body).await
    }

    /// Requests a JSON-only reply for the ticket classifier (§4.6).
    pub async fn invoke_json_object(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> ProviderResult<CanonicalResponse> {
        let wire_messages: Vec<Value> = messages.iter().map(message_to_wire).collect();
        let body = json!({
            "model": CHAT_MODEL,
            "messages": wire_messages,
            "temperature": temperature,
            "response_format": { "type": "json_object" },
        });
        self.chat(body).await
    }

    async fn chat(&self, body: Value) -> ProviderResult<CanonicalResponse> {
        let response = SHARED_HTTP_CLIENT
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(http_err(NAME))?;

        let response = ensure_success(NAME, response).await?;
        let wire: Value = response
            .json()
            .await
            .map_err(http_err(NAME))?;

        parse_chat_completion(&wire)
    }

    pub async fn embeddings(&self, texts: &[String]) -> ProviderResult<(Vec<Vec<f32>>, Usage)> {
        let body = json!({
            "model": "text-embedding-3-small",
            "input": texts,
        });

        let response = SHARED_HTTP_CLIENT
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(http_err(NAME))?;

        let response = ensure_success(NAME, response).await?;
        let wire: Value = response.json().await.map_err(http_err(NAME))?;

        let embeddings = wire["data"]
            .as_array()
            .ok_or_else(|| ProviderError::MalformedResponse(NAME, "missing data[]".into()))?
            .iter()
            .map(|entry| {
                entry["embedding"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect::<Vec<f32>>()
            })
            .collect();

        let usage = Usage {
            prompt_tokens: wire["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: wire["usage"]["total_tokens"].as_u64().unwrap_or(0),
        };

        Ok((embeddings, usage))
    }
}

/// Folds a legacy `files` list into the last user message as an ordered
/// sequence of text+image-URL parts (§4.2).
pub fn fold_legacy_files_into_last_user_message(
    messages: &mut [Message],
    files: &[relay_core::FileDescriptor],
) {
    let image_urls: Vec<&str> = files
        .iter()
        .filter(|f| f.kind == FileKind::Image)
        .filter_map(|f| f.url.as_deref())
        .collect();

    if image_urls.is_empty() {
        return;
    }

    if let Some(last_user) = messages.iter_mut().rev().find(|m| m.role == Role::User) {
        let existing_text = last_user
            .content
            .as_ref()
            .map(Content::last_text)
            .unwrap_or_default();

        let mut parts = vec![Part::Text { text: existing_text }];
        for url in image_urls {
            parts.push(Part::ImageUrl {
                image_url: relay_core::job::ImageUrl { url: url.to_string() },
            });
        }
        last_user.content = Some(Content::Parts(parts));
    }
}

fn message_to_wire(message: &Message) -> Value {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
        Role::Tool => "tool",
    };

    if message.role == Role::Tool {
        return json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content.as_ref().map(Content::last_text).unwrap_or_default(),
        });
    }

    if let Some(tool_calls) = &message.tool_calls {
        return json!({
            "role": role,
            "content": Value::Null,
            "tool_calls": tool_calls.iter().map(tool_call_to_wire).collect::<Vec<_>>(),
        });
    }

    json!({
        "role": role,
        "content": content_to_wire(message.content.as_ref()),
    })
}

fn content_to_wire(content: Option<&Content>) -> Value {
    match content {
        None => Value::Null,
        Some(Content::Text(text)) => Value::String(text.clone()),
        Some(Content::Parts(parts)) => Value::Array(
            parts
                .iter()
                .map(|p| match p {
                    Part::Text { text } => json!({"type": "text", "text": text}),
                    Part::ImageUrl { image_url } => {
                        json!({"type": "image_url", "image_url": {"url": image_url.url}})
                    }
                })
                .collect(),
        ),
    }
}

fn tool_call_to_wire(tc: &ToolCall) -> Value {
    json!({
        "id": tc.id,
        "type": "function",
        "function": { "name": tc.function.name, "arguments": tc.function.arguments },
    })
}

fn parse_chat_completion(wire: &Value) -> ProviderResult<CanonicalResponse> {
    let choice = wire["choices"].get(0).ok_or_else(|| {
        ProviderError::MalformedResponse(NAME, "missing choices[0]".into())
    })?;
    let message = &choice["message"];

    let content = message["content"].as_str().map(|s| s.to_string());
    let tool_calls = message["tool_calls"].as_array().map(|calls| {
        calls
            .iter()
            .enumerate()
            .map(|(i, c)| ToolCall {
                id: c["id"]
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("call_{i}")),
                kind: "function".to_string(),
                function: ToolCallFunction {
                    name: c["function"]["name"].as_str().unwrap_or_default().to_string(),
                    arguments: c["function"]["arguments"]
                        .as_str()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "{}".to_string()),
                },
            })
            .collect::<Vec<_>>()
    });

    let usage = Usage {
        prompt_tokens: wire["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        completion_tokens: wire["usage"]["completion_tokens"].as_u64().unwrap_or(0),
    };

    Ok(CanonicalResponse {
        choices: vec![relay_core::Choice {
            message: ChoiceMessage {
                role: "assistant".to_string(),
                content,
                tool_calls,
            },
        }],
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_text_completion() {
        let wire = json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3},
        });
        let canonical = parse_chat_completion(&wire).unwrap();
        assert_eq!(
            canonical.choices[0].message.content.as_deref(),
            Some("hi there")
        );
        assert_eq!(canonical.usage.prompt_tokens, 10);
    }

    #[test]
    fn parses_tool_call_completion() {
        let wire = json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{"id": "call_1", "function": {"name": "lookup", "arguments": "{}"}}],
            }}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2},
        });
        let canonical = parse_chat_completion(&wire).unwrap();
        let calls = canonical.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "lookup");
    }
}
