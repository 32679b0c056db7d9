//! `POST /embeddings` — synchronous, no queue (§2.4, §6).

use axum::extract::State;
use axum::Json;
use relay_core::RelayError;
use relay_providers::embed;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::RelayAxumError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub texts: Option<Vec<String>>,
    pub input: Option<Value>,
    pub provider: Option<String>,
    pub organization_id: Option<String>,
}

pub async fn handle(
    State(state): State<AppState>,
    Json(body): Json<EmbeddingsRequest>,
) -> Result<Json<Value>, RelayAxumError> {
    let texts = resolve_texts(&body)
        .ok_or_else(|| RelayError::bad_request("texts or input must be provided"))?;

    let provider = state
        .router
        .resolve(body.provider.as_deref(), state.config.allow_provider_override);

    let result = embed(&state.router, &provider, &texts)
        .await
        .map_err(|err| RelayError::general_error(err.to_string()))?;

    let model = if provider == "gemini" { "embedding-001" } else { "text-embedding-3-small" };
    let total_tokens = result.total_tokens;

    let data: Vec<Value> = result
        .embeddings
        .iter()
        .enumerate()
        .map(|(i, embedding)| json!({ "object": "embedding", "embedding": embedding, "index": i }))
        .collect();

    Ok(Json(json!({
        "object": "list",
        "data": data,
        "model": model,
        "usage": { "prompt_tokens": total_tokens, "total_tokens": total_tokens },
        "metadata": {
            "provider": provider,
            "credits_used": result.credits_used,
            "cost_usd": result.cost_usd,
        },
    })))
}

fn resolve_texts(body: &EmbeddingsRequest) -> Option<Vec<String>> {
    if let Some(texts) = &body.texts {
        if !texts.is_empty() {
            return Some(texts.clone());
        }
    }
    match &body.input {
        Some(Value::String(s)) => Some(vec![s.clone()]),
        Some(Value::Array(items)) => {
            let texts: Vec<String> = items.iter().filter_map(|v| v.as_str().map(|s| s.to_string())).collect();
            (!texts.is_empty()).then_some(texts)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(texts: Option<Vec<String>>, input: Option<Value>) -> EmbeddingsRequest {
        EmbeddingsRequest { texts, input, provider: None, organization_id: None }
    }

    #[test]
    fn prefers_texts_field_when_present() {
        let body = request(Some(vec!["a".to_string()]), Some(json!("ignored")));
        assert_eq!(resolve_texts(&body), Some(vec!["a".to_string()]));
    }

    #[test]
    fn falls_back_to_string_input() {
        let body = request(None, Some(json!("hello")));
        assert_eq!(resolve_texts(&body), Some(vec!["hello".to_string()]));
    }

    #[test]
    fn falls_back_to_array_input() {
        let body = request(None, Some(json!(["a", "b"])));
        assert_eq!(resolve_texts(&body), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn returns_none_when_nothing_usable() {
        assert_eq!(resolve_texts(&request(None, None)), None);
        assert_eq!(resolve_texts(&request(Some(vec![]), None)), None);
        assert_eq!(resolve_texts(&request(None, Some(json!(42)))), None);
    }
}
