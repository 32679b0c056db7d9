//! The Gemini-style adapter (§4.2). This is the most delicate piece: wire
//! translation runs in both directions and must round-trip tool calls
//! without loss across turns (§9).

use relay_core::job::{Content, FileKind, Part, Role, ToolCall, ToolCallFunction};
use relay_core::response::CanonicalResponse;
use relay_core::{ChoiceMessage, Message, Usage};
use serde_json::{json, Value};

use crate::common::{ensure_success, fetch_image_as_base64, http_err, SHARED_HTTP_CLIENT};
use crate::error::{ProviderError, ProviderResult};

const CHAT_MODEL: &str = "gemini-1.5-flash";
const NAME: &str = "gemini";

pub struct GeminiAdapter {
    api_key: String,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    pub async fn invoke(
        &self,
        messages: &[Message],
        legacy_files: Option<&[relay_core::FileDescriptor]>,
        temperature: f32,
        tools: Option<&[Value]>,
    ) -> ProviderResult<CanonicalResponse> {
        let contents = translate_outbound(messages, legacy_files).await;

        let mut body = json!({
            "contents": contents,
            "generationConfig": { "temperature": temperature },
        });

        if let Some(tools) = tools {
            body["tools"] = json!([{ "functionDeclarations": tools_to_declarations(tools) }]);
        }

        self.generate(body).await
    }

    /// Requests a JSON-only reply for the ticket classifier (§4.6).
    pub async fn invoke_json_object(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> ProviderResult<CanonicalResponse> {
        let contents = translate_outbound(messages, None).await;
        let body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": temperature,
                "responseMimeType": "application/json",
            },
        });
        self.generate(body).await
    }

    async fn generate(&self, body: Value) -> ProviderResult<CanonicalResponse> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, CHAT_MODEL, self.api_key
        );

        let response = SHARED_HTTP_CLIENT
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(http_err(NAME))?;

        let response = ensure_success(NAME, response).await?;
        let wire: Value = response.json().await.map_err(http_err(NAME))?;

        translate_inbound(&wire)
    }

    pub async fn embeddings(&self, texts: &[String]) -> ProviderResult<(Vec<Vec<f32>>, Usage)> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let url = format!(
                "{}/models/embedding-001:embedContent?key={}",
                self.base_url, self.api_key
            );
            let body = json!({ "content": { "parts": [{ "text": text }] } });

            let response = SHARED_HTTP_CLIENT
                .post(url)
                .json(&body)
                .send()
                .await
                .map_err(http_err(NAME))?;
            let response = ensure_success(NAME, response).await?;
            let wire: Value = response.json().await.map_err(http_err(NAME))?;

            let values = wire["embedding"]["values"]
                .as_array()
                .ok_or_else(|| ProviderError::MalformedResponse(NAME, "missing embedding.values".into()))?
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            embeddings.push(values);
        }

        // Gemini's embedContent does not return token usage; zero-filled (§4.2 inbound rule).
        Ok((embeddings, Usage::default()))
    }
}

fn tools_to_declarations(tools: &[Value]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            let function = &t["function"];
            json!({
                "name": function["name"],
                "description": function["description"],
                "parameters": function["parameters"],
            })
        })
        .collect()
}

async fn translate_outbound(
    messages: &[Message],
    legacy_files: Option<&[relay_core::FileDescriptor]>,
) -> Vec<Value> {
    let mut contents = Vec::with_capacity(messages.len());
    let last_user_index = messages.iter().rposition(|m| m.role == Role::User);

    for (i, message) in messages.iter().enumerate() {
        // Rule 1: tool role -> user-role functionResponse part.
        if message.role == Role::Tool {
            contents.push(json!({
                "role": "user",
                "parts": [{
                    "functionResponse": {
                        "name": message.name.clone().unwrap_or_default(),
                        "response": { "content": message.content.as_ref().map(Content::last_text).unwrap_or_default() },
                    }
                }],
            }));
            continue;
        }

        // Rule 2: assistant message carrying tool calls -> model-role functionCall parts.
        if let Some(tool_calls) = &message.tool_calls {
            let parts: Vec<Value> = tool_calls
                .iter()
                .map(|tc| {
                    let args: Value =
                        serde_json::from_str(&tc.function.arguments).unwrap_or(Value::Null);
                    json!({ "functionCall": { "name": tc.function.name, "args": args } })
                })
                .collect();
            contents.push(json!({ "role": "model", "parts": parts }));
            continue;
        }

        // Rules 3-4: translate content into text/inline_data parts.
        let mut parts = match &message.content {
            Some(Content::Parts(content_parts)) => {
                let mut parts = Vec::with_capacity(content_parts.len());
                for part in content_parts {
                    match part {
                        Part::Text { text } => parts.push(json!({ "text": text })),
                        Part::ImageUrl { image_url } => {
                            if let Some((mime_type, data)) =
                                fetch_image_as_base64(&image_url.url).await
                            {
                                parts.push(json!({ "inline_data": { "mime_type": mime_type, "data": data } }));
                            }
                            // fetch failure: image skipped, message still proceeds.
                        }
                    }
                }
                parts
            }
            Some(Content::Text(text)) => vec![json!({ "text": text })],
            None => Vec::new(),
        };

        // Rule 5: legacy files appended to the final user message.
        if Some(i) == last_user_index {
            if let Some(files) = legacy_files {
                for file in files.iter().filter(|f| f.kind == FileKind::Image) {
                    if let Some(inline) = inline_data_for_file(file).await {
                        parts.push(inline);
                    }
                }
            }
        }

        // Rule 6: role mapping.
        let role = if message.role == Role::Assistant { "model" } else { "user" };
        contents.push(json!({ "role": role, "parts": parts }));
    }

    contents
}

async fn inline_data_for_file(file: &relay_core::FileDescriptor) -> Option<Value> {
    if let Some(base64_data) = &file.base64 {
        return Some(json!({ "inline_data": { "mime_type": "image/jpeg", "data": base64_data } }));
    }
    let url = file.url.as_deref()?;
    let (mime_type, data) = fetch_image_as_base64(url).await?;
    Some(json!({ "inline_data": { "mime_type": mime_type, "data": data } }))
}

fn translate_inbound(wire: &Value) -> ProviderResult<CanonicalResponse> {
    let candidate = wire["candidates"].get(0);

    let usage = Usage {
        prompt_tokens: wire["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0),
        completion_tokens: wire["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0),
    };

    let parts = candidate.and_then(|c| c["content"]["parts"].as_array());

    let parts = match parts {
        None => {
            // Safety block: candidate present but no content/parts (or no candidate at all).
            return Ok(CanonicalResponse::text(
                "assistant",
                CanonicalResponse::SAFETY_BLOCKED_PLACEHOLDER,
                usage,
            ));
        }
        Some(parts) => parts,
    };

    let function_calls: Vec<&Value> = parts
        .iter()
        .filter(|p| p.get("functionCall").is_some())
        .collect();

    if !function_calls.is_empty() {
        let ts = chrono::Utc::now().timestamp_millis();
        let tool_calls: Vec<ToolCall> = function_calls
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let call = &p["functionCall"];
                let args = call["args"].clone();
                ToolCall {
                    id: format!("call_{ts}_{i}"),
                    kind: "function".to_string(),
                    function: ToolCallFunction {
                        name: call["name"].as_str().unwrap_or_default().to_string(),
                        arguments: serde_json::to_string(&args).unwrap_or_else(|_| "{}".to_string()),
                    },
                }
            })
            .collect();

        return Ok(CanonicalResponse {
            choices: vec![relay_core::Choice {
                message: ChoiceMessage {
                    role: "assistant".to_string(),
                    content: None,
                    tool_calls: Some(tool_calls),
                },
            }],
            usage,
        });
    }

    let text = parts
        .first()
        .and_then(|p| p["text"].as_str())
        .unwrap_or_default();

    Ok(CanonicalResponse::text("assistant", text, usage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_block_maps_to_placeholder() {
        let wire = json!({ "candidates": [{ "index": 0 }] });
        let canonical = translate_inbound(&wire).unwrap();
        assert_eq!(
            canonical.choices[0].message.content.as_deref(),
            Some(CanonicalResponse::SAFETY_BLOCKED_PLACEHOLDER)
        );
    }

    #[test]
    fn missing_candidates_maps_to_placeholder() {
        let wire = json!({});
        let canonical = translate_inbound(&wire).unwrap();
        assert_eq!(
            canonical.choices[0].message.content.as_deref(),
            Some(CanonicalResponse::SAFETY_BLOCKED_PLACEHOLDER)
        );
    }

    #[test]
    fn function_call_part_becomes_tool_call() {
        let wire = json!({
            "candidates": [{
                "content": { "parts": [{ "functionCall": { "name": "lookup", "args": {"q": "x"} } }] }
            }],
        });
        let canonical = translate_inbound(&wire).unwrap();
        let calls = canonical.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "lookup");
        assert!(calls[0].id.starts_with("call_"));
    }

    #[test]
    fn plain_text_part_is_returned() {
        let wire = json!({
            "candidates": [{ "content": { "parts": [{ "text": "hello" }] } }],
        });
        let canonical = translate_inbound(&wire).unwrap();
        assert_eq!(canonical.choices[0].message.content.as_deref(), Some("hello"));
    }
}
