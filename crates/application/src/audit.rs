use async_trait::async_trait;
use diagrid_core::AppResult;
use diagrid_domain::AuditAction;

/// Audit record emitted by administration use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Username of the acting administrator.
    pub subject: String,
    /// Stable action code.
    pub action: AuditAction,
    /// Kind of resource acted on.
    pub resource_type: String,
    /// Identifier of the resource acted on.
    pub resource_id: String,
    /// Human-readable detail.
    pub detail: Option<String>,
}

/// Append-only audit sink.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
