use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Infrastructure errors for queue and lock operations. Job-level
/// failures (provider errors, timeouts) are never represented here — they
/// are captured in the result slot payload instead (§4.4).
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("lock not acquired for tenant: {0}")]
    LockNotAcquired(String),

    #[error("result wait timed out")]
    WaitTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}
