//! `POST /chat` — the chat admission path (§4.5).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use relay_core::job::{FileDescriptor, Message, ToolSchema};
use relay_core::{Job, JobId, RelayError, TenantId};
use relay_queue::{admit, wait_for_result, QueueError, ResultEnvelope};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RelayAxumError;
use crate::state::AppState;
use crate::worker_runner::ChatJobRunner;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<Message>>,
    pub files: Option<Vec<FileDescriptor>>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub provider: Option<String>,
    pub organization_id: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "nameUser")]
    pub name_user: Option<String>,
    pub ticket_id: Option<String>,
    pub ticket_categories: Option<Vec<String>>,
    pub tools: Option<Vec<ToolSchema>>,
    pub tool_choice: Option<Value>,
}

fn default_temperature() -> f32 {
    0.7
}

pub async fn handle(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Result<Json<Value>, RelayAxumError> {
    let messages = body
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| RelayError::bad_request("messages must be a non-empty array"))?;

    let tenant = TenantId::from_optional(body.organization_id.as_deref());
    let job_id = JobId::new(tenant.as_str());
    let provider = state
        .router
        .resolve(body.provider.as_deref(), state.config.allow_provider_override);

    let job = Job {
        job_id: job_id.to_string(),
        request_id: uuid::Uuid::new_v4().to_string(),
        tenant_id: tenant.as_str().to_string(),
        provider,
        messages,
        files: body.files,
        temperature: body.temperature,
        tools: body.tools,
        tool_choice: body.tool_choice,
        ticket_id: body.ticket_id,
        ticket_categories: body.ticket_categories,
        category: body.category,
        name_user: body.name_user,
        started_at: Utc::now(),
    };

    let runner = Arc::new(ChatJobRunner::new(Arc::clone(&state.router), Arc::clone(&state.config)));
    admit(&state.gateway, &state.registry, &job, runner)
        .await
        .map_err(|err| RelayError::general_error(err.to_string()))?;

    match wait_for_result(&state.gateway, &job.job_id).await {
        Ok(ResultEnvelope::Success { data, .. }) => Ok(Json(data)),
        Ok(ResultEnvelope::Failure { error, .. }) => Err(RelayError::general_error(error).into()),
        Err(QueueError::WaitTimeout) => Err(RelayError::general_error("Timeout").into()),
        Err(err) => Err(RelayError::general_error(err.to_string()).into()),
    }
}
