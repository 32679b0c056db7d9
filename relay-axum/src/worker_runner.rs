//! Glues the provider router and cost accounting together into the
//! [`relay_queue::JobRunner`] the worker loop executes per job. Kept in the
//! HTTP crate since it also assembles the `metadata` block the front-end
//! promises (§6).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use relay_core::cost::{chat_cost_usd, detect_query_type};
use relay_core::{Config, Job};
use relay_providers::ProviderRouter;
use relay_queue::JobRunner;
use serde_json::Value;

use crate::classifier;

pub struct ChatJobRunner {
    router: Arc<ProviderRouter>,
    config: Arc<Config>,
}

impl ChatJobRunner {
    pub fn new(router: Arc<ProviderRouter>, config: Arc<Config>) -> Self {
        Self { router, config }
    }
}

#[async_trait]
impl JobRunner for ChatJobRunner {
    async fn run(&self, job: Job) -> anyhow::Result<Value> {
        let query_type = detect_query_type(&job);

        let response = self
            .router
            .invoke_chat(&job)
            .await
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;

        let response_time_ms = (Utc::now() - job.started_at).num_milliseconds().max(0);
        let cost_usd = chat_cost_usd(&job.provider, &response.usage);

        let metadata = serde_json::json!({
            "request_id": job.request_id,
            "provider": job.provider,
            "nameUser": job.name_user,
            "hasFiles": job.has_files(),
            "timestamp": Utc::now().to_rfc3339(),
            "query_type": query_type.as_str(),
            "priority": job.category,
            "credits_used": query_type.credits(),
            "response_time_ms": response_time_ms,
            "cost_usd": cost_usd,
        });

        if job.is_low_priority() && job.ticket_id.is_some() {
            classifier::spawn(
                Arc::clone(&self.router),
                Arc::clone(&self.config),
                job.clone(),
                response.clone(),
            );
        }

        let mut body = serde_json::to_value(&response)?;
        body["metadata"] = metadata;
        Ok(body)
    }
}
