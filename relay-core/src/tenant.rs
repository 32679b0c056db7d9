//! Core multi-tenant types.

/// A tenant (organization) identifier. Defaults to `"default_org"` when a
/// request does not supply `organization_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

impl TenantId {
    pub const DEFAULT: &'static str = "default_org";

    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self(tenant.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve an optional `organization_id` field to a tenant id, falling
    /// back to the default organization.
    pub fn from_optional(organization_id: Option<&str>) -> Self {
        match organization_id {
            Some(id) if !id.is_empty() => Self::new(id),
            _ => Self::new(Self::DEFAULT),
        }
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried with every request once admitted into the queue.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub request_id: String,
}

impl TenantContext {
    pub fn new<S: Into<String>>(tenant: S, request_id: impl Into<String>) -> Self {
        Self {
            tenant_id: TenantId(tenant.into()),
            request_id: request_id.into(),
        }
    }
}
