//! The post-response ticket classifier (§4.6). Runs fire-and-forget after a
//! successful chat reply; any failure here must never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use relay_core::job::{Content, Message, Role};
use relay_core::{CanonicalResponse, Config, Job};
use relay_providers::ProviderRouter;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct Classification {
    title: String,
    category: String,
    priority: String,
    reason: String,
}

/// Spawns the classifier as a detached task. Never awaited by the caller.
pub fn spawn(router: Arc<ProviderRouter>, config: Arc<Config>, job: Job, response: CanonicalResponse) {
    tokio::spawn(async move {
        if let Err(err) = classify_and_notify(&router, &config, &job, &response).await {
            warn!(job_id = %job.job_id, %err, "ticket classifier failed");
        }
    });
}

async fn classify_and_notify(
    router: &ProviderRouter,
    config: &Config,
    job: &Job,
    response: &CanonicalResponse,
) -> anyhow::Result<()> {
    let ticket_id = job
        .ticket_id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no ticket_id"))?;
    let categories = job.ticket_categories.clone().unwrap_or_default();
    let reply_text = response.choices[0].message.content.clone().unwrap_or_default();

    let system_prompt = format!(
        "You classify support tickets. Available categories: {}. Reply with JSON only: {{\"title\":...,\"category\":...,\"priority\":...,\"reason\":...}}.",
        categories.join(", ")
    );
    let user_prompt = format!("Assistant reply to classify:\n{reply_text}");

    let messages = vec![
        Message {
            role: Role::System,
            content: Some(Content::Text(system_prompt)),
            tool_calls: None,
            name: None,
            tool_call_id: None,
        },
        Message {
            role: Role::User,
            content: Some(Content::Text(user_prompt)),
            tool_calls: None,
            name: None,
            tool_call_id: None,
        },
    ];

    let classifier_response = router.invoke_classifier(&job.provider, &messages).await?;
    let raw = classifier_response.choices[0]
        .message
        .content
        .clone()
        .ok_or_else(|| anyhow::anyhow!("classifier returned no content"))?;

    let mut classification: Classification = serde_json::from_str(&raw)?;
    coerce_unknown_category(&mut classification, &categories);

    notify_webhook(config, &ticket_id, &classification).await
}

/// Coerces a classification into `"general"` when its category isn't one of
/// the ticket's allowed categories, preserving the original reason.
fn coerce_unknown_category(classification: &mut Classification, categories: &[String]) {
    if !categories.is_empty() && !categories.contains(&classification.category) {
        classification.reason = format!(
            "{} (category '{}' not in allowed list, coerced to 'general')",
            classification.reason, classification.category
        );
        classification.category = "general".to_string();
    }
}

async fn notify_webhook(config: &Config, ticket_id: &str, classification: &Classification) -> anyhow::Result<()> {
    let base_url = config
        .webhook_base_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("no webhook configured"))?;

    let body: Value = serde_json::json!({
        "ticket_id": ticket_id,
        "title": classification.title,
        "category": classification.category,
        "priority": classification.priority,
        "reason": classification.reason,
    });

    let mut request = relay_providers::common::SHARED_HTTP_CLIENT
        .put(base_url)
        .timeout(Duration::from_secs(10))
        .json(&body);

    if let Some(secret) = &config.webhook_secret {
        request = request.header("x-api-key", secret);
    }

    let response = request.send().await?;
    if response.status().is_success() {
        info!(ticket_id, "ticket classification delivered to webhook");
    } else {
        warn!(ticket_id, status = %response.status(), "webhook rejected ticket classification");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(category: &str) -> Classification {
        Classification {
            title: "t".to_string(),
            category: category.to_string(),
            priority: "low".to_string(),
            reason: "because".to_string(),
        }
    }

    #[test]
    fn leaves_allowed_category_untouched() {
        let mut c = classification("billing");
        coerce_unknown_category(&mut c, &["billing".to_string(), "shipping".to_string()]);
        assert_eq!(c.category, "billing");
        assert_eq!(c.reason, "because");
    }

    #[test]
    fn coerces_unknown_category_to_general() {
        let mut c = classification("sorcery");
        coerce_unknown_category(&mut c, &["billing".to_string()]);
        assert_eq!(c.category, "general");
        assert!(c.reason.contains("coerced to 'general'"));
    }

    #[test]
    fn empty_allowed_list_passes_through_any_category() {
        let mut c = classification("anything");
        coerce_unknown_category(&mut c, &[]);
        assert_eq!(c.category, "anything");
    }
}
