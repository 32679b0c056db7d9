//! `POST /audio` — transcription via OpenAI's `whisper-1` (§4.7).
//!
//! Errors are swallowed into a 200 response: the caller's front end uses
//! the response body itself as a save signal, never the status code.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

const NO_SPEECH_PLACEHOLDER: &str = "[Audio processed. No spoken words detected (Music/Instrumental).]";

#[derive(Debug, Deserialize)]
pub struct AudioRequest {
    pub url: String,
    pub model: Option<String>,
}

pub async fn handle(State(state): State<AppState>, Json(body): Json<AudioRequest>) -> Json<Value> {
    match transcribe(&state, &body).await {
        Ok(text) => Json(json!({ "output": { "result": resolve_transcript(text) } })),
        Err(err) => Json(json!({ "output": { "result": format!("[Error processing audio: {err}]") } })),
    }
}

fn resolve_transcript(text: String) -> String {
    if text.trim().is_empty() {
        NO_SPEECH_PLACEHOLDER.to_string()
    } else {
        text
    }
}

async fn transcribe(state: &AppState, body: &AudioRequest) -> anyhow::Result<String> {
    let api_key = state
        .config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("openai is not configured"))?;

    let bytes = relay_providers::common::SHARED_HTTP_CLIENT
        .get(&body.url)
        .send()
        .await?
        .bytes()
        .await?;
    let model = body.model.clone().unwrap_or_else(|| "whisper-1".to_string());

    let form = reqwest::multipart::Form::new()
        .text("model", model)
        .part("file", reqwest::multipart::Part::bytes(bytes.to_vec()).file_name("audio"));

    let response = relay_providers::common::SHARED_HTTP_CLIENT
        .post("https://api.openai.com/v1/audio/transcriptions")
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("upstream returned {status}: {text}");
    }

    let wire: Value = response.json().await?;
    Ok(wire["text"].as_str().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_transcript_becomes_placeholder() {
        assert_eq!(resolve_transcript("   ".to_string()), NO_SPEECH_PLACEHOLDER);
        assert_eq!(resolve_transcript(String::new()), NO_SPEECH_PLACEHOLDER);
    }

    #[test]
    fn nonblank_transcript_passes_through() {
        assert_eq!(resolve_transcript("hello world".to_string()), "hello world");
    }
}
