//! Lua scripts executed atomically server-side.

/// Deletes `lock:{tenant}` iff `queue:{tenant}` is empty, returning 1 if it
/// deleted the lock and 0 if a job was pushed concurrently (§4.1, §4.4).
/// This prevents the race where a worker decides to shut down while a
/// producer pushes a new job.
pub const CLEANUP_SCRIPT: &str = r#"
if redis.call('LLEN', KEYS[1]) == 0 then
    redis.call('DEL', KEYS[2])
    return 1
else
    return 0
end
"#;
