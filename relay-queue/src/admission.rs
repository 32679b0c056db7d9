//! Job admission and the result-coupling wait (§4.5).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueueError, QueueResult};
use crate::gateway::KvGateway;
use crate::queue::{self, WAIT_FOR_RESULT_TIMEOUT_SECS, WAIT_POLL_INTERVAL_MS};
use crate::worker::{JobRunner, WorkerRegistry};

/// The `{success, data|error}` envelope written into a result slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    Success { success: bool, data: serde_json::Value },
    Failure { success: bool, error: String },
}

/// Pushes a job onto its tenant queue and ensures a worker is running for
/// that tenant (§4.5 steps 5-6).
pub async fn admit(
    gateway: &Arc<KvGateway>,
    registry: &Arc<WorkerRegistry>,
    job: &relay_core::Job,
    runner: Arc<dyn JobRunner>,
) -> QueueResult<()> {
    let payload = serde_json::to_string(job)?;
    gateway.rpush(&queue::queue_key(&job.tenant_id), &payload).await?;

    let spawned = registry.spawn_if_absent(Arc::clone(gateway), job.tenant_id.clone(), runner);
    debug!(tenant = %job.tenant_id, job_id = %job.job_id, spawned, "admitted job");
    Ok(())
}

/// Polls `result:{jobId}` every `WAIT_POLL_INTERVAL_MS` until a value
/// appears or `WAIT_FOR_RESULT_TIMEOUT_SECS` elapses (§4.5 step 7).
///
/// On finding a value the slot is deleted by this reader. On timeout the
/// slot is left alone: the job may still complete later and the result
/// ages out via TTL.
pub async fn wait_for_result(gateway: &Arc<KvGateway>, job_id: &str) -> QueueResult<ResultEnvelope> {
    let key = queue::result_key(job_id);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(WAIT_FOR_RESULT_TIMEOUT_SECS);

    loop {
        if let Some(raw) = gateway.get(&key).await? {
            gateway.del(&key).await?;
            let envelope: ResultEnvelope = serde_json::from_str(&raw)?;
            return Ok(envelope);
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(QueueError::WaitTimeout);
        }

        tokio::time::sleep(Duration::from_millis(WAIT_POLL_INTERVAL_MS)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_round_trips() {
        let envelope = ResultEnvelope::Success {
            success: true,
            data: serde_json::json!({"role": "assistant", "content": "hi"}),
        };
        let raw = serde_json::to_string(&envelope).unwrap();
        let back: ResultEnvelope = serde_json::from_str(&raw).unwrap();
        match back {
            ResultEnvelope::Success { success, data } => {
                assert!(success);
                assert_eq!(data["content"], "hi");
            }
            ResultEnvelope::Failure { .. } => panic!("expected Success"),
        }
    }

    #[test]
    fn failure_envelope_round_trips() {
        let envelope = ResultEnvelope::Failure {
            success: false,
            error: "all providers failed".to_string(),
        };
        let raw = serde_json::to_string(&envelope).unwrap();
        let back: ResultEnvelope = serde_json::from_str(&raw).unwrap();
        match back {
            ResultEnvelope::Failure { success, error } => {
                assert!(!success);
                assert_eq!(error, "all providers failed");
            }
            ResultEnvelope::Success { .. } => panic!("expected Failure"),
        }
    }
}
