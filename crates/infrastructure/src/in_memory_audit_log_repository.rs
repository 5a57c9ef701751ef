use async_trait::async_trait;
use diagrid_application::{AuditEvent, AuditRepository};
use diagrid_core::AppResult;
use tokio::sync::Mutex;

/// In-memory audit sink that also emits each event as a structured log line.
#[derive(Debug, Default)]
pub struct InMemoryAuditLogRepository {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditLogRepository {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event, oldest first.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditLogRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        tracing::info!(
            subject = %event.subject,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            detail = event.detail.as_deref().unwrap_or(""),
            "audit event"
        );
        self.events.lock().await.push(event);
        Ok(())
    }
}
