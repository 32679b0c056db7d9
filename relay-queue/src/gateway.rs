//! The KV store gateway (§4.1).
//!
//! Two independent connections are held: `commands` for every non-blocking
//! operation (push, get, setex, setNX, del, eval) and `blocking` dedicated
//! to `BLPOP`. They MUST stay separate — sharing one connection between a
//! blocking pop and ordinary commands causes head-of-line blocking on the
//! same physical connection (§9).

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::QueueResult;
use crate::scripts::CLEANUP_SCRIPT;

#[derive(Clone)]
pub struct KvGateway {
    commands: ConnectionManager,
    blocking: ConnectionManager,
}

impl KvGateway {
    pub async fn connect(redis_url: &str) -> QueueResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let commands = client.get_connection_manager().await?;
        let blocking = client.get_connection_manager().await?;
        Ok(Self { commands, blocking })
    }

    pub async fn rpush(&self, key: &str, payload: &str) -> QueueResult<()> {
        let mut conn = self.commands.clone();
        let _: i64 = conn.rpush(key, payload).await?;
        Ok(())
    }

    /// Blocks up to `timeout_secs` on the dedicated blocking connection.
    /// Returns the popped payload, or `None` on timeout.
    pub async fn blpop(&self, key: &str, timeout_secs: u64) -> QueueResult<Option<String>> {
        let mut conn = self.blocking.clone();
        let result: Option<(String, String)> = conn.blpop(key, timeout_secs as f64).await?;
        Ok(result.map(|(_, payload)| payload))
    }

    /// Sets `key` to `value` only if absent, with a TTL. Returns whether it was set.
    pub async fn set_nx(&self, key: &str, value: &str, ttl_secs: u64) -> QueueResult<bool> {
        let mut conn = self.commands.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    pub async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> QueueResult<()> {
        let mut conn = self.commands.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> QueueResult<Option<String>> {
        let mut conn = self.commands.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    pub async fn del(&self, key: &str) -> QueueResult<()> {
        let mut conn = self.commands.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// Runs the cleanup script atomically against `queue:{tenant}` and
    /// `lock:{tenant}`. Returns `true` if the lock was deleted (queue was empty).
    pub async fn cleanup_if_empty(&self, queue_key: &str, lock_key: &str) -> QueueResult<bool> {
        let mut conn = self.commands.clone();
        let deleted: i64 = redis::cmd("EVAL")
            .arg(CLEANUP_SCRIPT)
            .arg(2)
            .arg(queue_key)
            .arg(lock_key)
            .query_async(&mut conn)
            .await?;
        debug!(queue_key, deleted = deleted == 1, "ran cleanup script");
        Ok(deleted == 1)
    }
}

impl std::fmt::Debug for KvGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvGateway").finish_non_exhaustive()
    }
}

/// Best-effort lock release on an unexpected crash path (§4.4 step 3).
pub async fn force_unlock(gateway: &KvGateway, lock_key: &str) {
    if let Err(err) = gateway.del(lock_key).await {
        tracing::warn!(%err, lock_key, "failed to release lock during crash cleanup");
    }
}
