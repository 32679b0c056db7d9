//! Key naming for the three KV structures the queue relies on (§6).

pub fn queue_key(tenant: &str) -> String {
    format!("queue:{tenant}")
}

pub fn lock_key(tenant: &str) -> String {
    format!("lock:{tenant}")
}

pub fn result_key(job_id: &str) -> String {
    format!("result:{job_id}")
}

/// TTL for a tenant lock (§3): must exceed the longest permitted job, with margin.
pub const LOCK_TTL_SECS: u64 = 300;

/// TTL for a published result slot (§3, §4.4).
pub const RESULT_TTL_SECS: u64 = 300;

/// Blocking-pop timeout; bounds idle wake-up latency for cleanup (§4.4, §5).
pub const BLPOP_TIMEOUT_SECS: u64 = 1;

/// Wall-clock deadline the HTTP front-end waits for a result (§4.5).
pub const WAIT_FOR_RESULT_TIMEOUT_SECS: u64 = 180;

/// Poll interval while waiting for a result (§4.5, §9).
pub const WAIT_POLL_INTERVAL_MS: u64 = 100;

/// Hard timeout for a single upstream provider call (§4.2, §5).
pub const PROVIDER_CALL_TIMEOUT_SECS: u64 = 180;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_tenant_and_job() {
        assert_eq!(queue_key("acme"), "queue:acme");
        assert_eq!(lock_key("acme"), "lock:acme");
        assert_eq!(result_key("job-1"), "result:job-1");
    }
}
