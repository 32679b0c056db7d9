//! Job identifiers.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Tenant-prefixed job id: `{tenant}-{ms-epoch}-{9-char random}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(tenant: &str) -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis();
        let suffix = random_suffix(9);
        Self(format!("{tenant}-{ms}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_tenant_prefixed() {
        let id = JobId::new("acme");
        assert!(id.as_str().starts_with("acme-"));
        assert_eq!(id.as_str().split('-').count(), 3);
    }
}
