//! `POST /image/ocr` — fixed-prompt OCR via an OpenAI chat completion (§4.7).
//!
//! Errors are swallowed into a 200 response, same save-signal convention
//! as `/audio`.

use axum::extract::State;
use axum::Json;
use relay_core::job::{Content, ImageUrl, Message, Part, Role};
use relay_providers::OpenAiAdapter;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

const NO_TEXT_TOKEN: &str = "[NO_TEXT_DETECTED]";
const NO_TEXT_PLACEHOLDER: &str = "Visual content only. No text detected in this image.";

const SYSTEM_PROMPT: &str = "You perform OCR. Read every piece of visible text in the image and return it verbatim, preserving line breaks. If the image contains no readable text, reply with exactly the token [NO_TEXT_DETECTED] and nothing else.";

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    pub image_url: String,
}

pub async fn handle(State(state): State<AppState>, Json(body): Json<OcrRequest>) -> Json<Value> {
    match run_ocr(&state, &body.image_url).await {
        Ok(text) => Json(json!({ "content": resolve_ocr_text(text) })),
        Err(err) => Json(json!({ "content": format!("Error processing image: {err}") })),
    }
}

fn resolve_ocr_text(text: String) -> String {
    if text.trim().is_empty() || text.contains(NO_TEXT_TOKEN) {
        NO_TEXT_PLACEHOLDER.to_string()
    } else {
        text
    }
}

async fn run_ocr(state: &AppState, image_url: &str) -> anyhow::Result<String> {
    let api_key = state
        .config
        .openai_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("openai is not configured"))?;

    let adapter = OpenAiAdapter::new(api_key);
    let messages = vec![
        Message {
            role: Role::System,
            content: Some(Content::Text(SYSTEM_PROMPT.to_string())),
            tool_calls: None,
            name: None,
            tool_call_id: None,
        },
        Message {
            role: Role::User,
            content: Some(Content::Parts(vec![
                Part::Text { text: "Extract the text from this image.".to_string() },
                Part::ImageUrl { image_url: ImageUrl { url: image_url.to_string() } },
            ])),
            tool_calls: None,
            name: None,
            tool_call_id: None,
        },
    ];

    let response = adapter.invoke(&messages, true, 0.0, None, None).await?;
    Ok(response.choices[0].message.content.clone().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_becomes_placeholder() {
        assert_eq!(resolve_ocr_text(String::new()), NO_TEXT_PLACEHOLDER);
        assert_eq!(resolve_ocr_text("   ".to_string()), NO_TEXT_PLACEHOLDER);
    }

    #[test]
    fn no_text_token_becomes_placeholder() {
        assert_eq!(resolve_ocr_text("[NO_TEXT_DETECTED]".to_string()), NO_TEXT_PLACEHOLDER);
    }

    #[test]
    fn recognized_text_passes_through() {
        assert_eq!(resolve_ocr_text("STOP sign".to_string()), "STOP sign");
    }
}
