//! The per-tenant worker (§4.4) and the process-local registry that avoids
//! spawning more than one of them per tenant per process.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::gateway::{force_unlock, KvGateway};
use crate::queue::{self, BLPOP_TIMEOUT_SECS, LOCK_TTL_SECS, RESULT_TTL_SECS};

/// Executes one decoded job and returns the data to publish in the result
/// slot on success. Implemented by the binary crate, which wires the
/// provider router and cost accounting together (kept out of relay-queue
/// so the queue has no dependency on provider wire formats).
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: relay_core::Job) -> anyhow::Result<serde_json::Value>;
}

/// Process-local map from tenant id to its running worker task. Not
/// authoritative for correctness — the KV lock is (§3) — this only avoids
/// redundant spawns within one process.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl WorkerRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawns a worker for `tenant` if one isn't already locally registered.
    /// Returns `true` if a new worker was spawned.
    pub fn spawn_if_absent(
        self: &Arc<Self>,
        gateway: Arc<KvGateway>,
        tenant: String,
        runner: Arc<dyn JobRunner>,
    ) -> bool {
        let mut workers = self.workers.lock();
        if workers.contains_key(&tenant) {
            return false;
        }

        let registry = Arc::clone(self);
        let tenant_for_task = tenant.clone();
        let handle = tokio::spawn(async move {
            supervise(gateway, tenant_for_task.clone(), runner).await;
            registry.remove(&tenant_for_task);
        });
        workers.insert(tenant, handle);
        true
    }

    fn remove(&self, tenant: &str) {
        self.workers.lock().remove(tenant);
    }
}

/// Runs the worker loop and releases the lock on a panic, since the loop
/// itself cannot clean up after its own unwind (§4.4 step 3).
async fn supervise(gateway: Arc<KvGateway>, tenant: String, runner: Arc<dyn JobRunner>) {
    let lock_key = queue::lock_key(&tenant);
    let outcome = AssertUnwindSafe(run_worker(gateway.clone(), tenant.clone(), runner))
        .catch_unwind()
        .await;
    if outcome.is_err() {
        error!(tenant = %tenant, "worker task panicked; releasing lock");
        force_unlock(&gateway, &lock_key).await;
    }
}

async fn run_worker(gateway: Arc<KvGateway>, tenant: String, runner: Arc<dyn JobRunner>) {
    let lock_key = queue::lock_key(&tenant);
    let queue_key = queue::queue_key(&tenant);

    match gateway.set_nx(&lock_key, "1", LOCK_TTL_SECS).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(tenant = %tenant, "lock already held elsewhere; not starting worker");
            return;
        }
        Err(err) => {
            error!(%err, tenant = %tenant, "failed to acquire lock");
            return;
        }
    }

    info!(tenant = %tenant, "worker started");

    loop {
        match gateway.blpop(&queue_key, BLPOP_TIMEOUT_SECS).await {
            Ok(Some(payload)) => process_job(&gateway, &runner, &payload).await,
            Ok(None) => match gateway.cleanup_if_empty(&queue_key, &lock_key).await {
                Ok(true) => {
                    info!(tenant = %tenant, "queue empty; releasing lock and exiting");
                    break;
                }
                Ok(false) => continue,
                Err(err) => {
                    error!(%err, tenant = %tenant, "cleanup script failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
            Err(err) => {
                error!(%err, tenant = %tenant, "blpop failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }

    info!(tenant = %tenant, "worker stopped");
}

/// Decodes and executes one job, then publishes its outcome. Never
/// propagates an error out of this function — the worker loop must keep
/// running regardless of what a single job does (§4.4 step 2).
async fn process_job(gateway: &KvGateway, runner: &Arc<dyn JobRunner>, payload: &str) {
    let job: relay_core::Job = match serde_json::from_str(payload) {
        Ok(job) => job,
        Err(err) => {
            error!(%err, "failed to decode job payload; dropping");
            return;
        }
    };

    let job_id = job.job_id.clone();
    let result_key = queue::result_key(&job_id);

    let body = match runner.run(job).await {
        Ok(data) => serde_json::json!({ "success": true, "data": data }),
        Err(err) => {
            warn!(job_id = %job_id, %err, "job failed");
            serde_json::json!({ "success": false, "error": err.to_string() })
        }
    };

    match serde_json::to_string(&body) {
        Ok(encoded) => {
            if let Err(err) = gateway.setex(&result_key, RESULT_TTL_SECS, &encoded).await {
                error!(%err, job_id = %job_id, "failed to publish result");
            }
        }
        Err(err) => error!(%err, job_id = %job_id, "failed to encode result"),
    }
}
