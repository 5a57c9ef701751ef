use async_trait::async_trait;
use diagrid_application::GrantRepository;
use diagrid_core::{AppError, AppResult};
use diagrid_domain::{DiagramGrant, DiagramId, GrantId, PermissionLevel, PrincipalRef};
use tokio::sync::RwLock;

/// In-memory grant store. Deactivated grants are kept, matching the
/// audit-preserving behavior of the Persistence API.
#[derive(Debug, Default)]
pub struct InMemoryGrantRepository {
    grants: RwLock<Vec<DiagramGrant>>,
}

impl InMemoryGrantRepository {
    /// Creates an empty grant store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a grant row as-is.
    pub async fn seed_grant(&self, grant: DiagramGrant) {
        self.grants.write().await.push(grant);
    }
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn list_active_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| grant.active && grant.diagram_id == *diagram_id)
            .cloned()
            .collect())
    }

    async fn list_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| grant.diagram_id == *diagram_id)
            .cloned()
            .collect())
    }

    async fn find(&self, grant_id: GrantId) -> AppResult<Option<DiagramGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .find(|grant| grant.id == grant_id)
            .cloned())
    }

    async fn create(&self, grant: DiagramGrant) -> AppResult<()> {
        self.grants.write().await.push(grant);
        Ok(())
    }

    async fn update_permission(&self, grant_id: GrantId, level: PermissionLevel) -> AppResult<()> {
        let mut grants = self.grants.write().await;
        let grant = grants
            .iter_mut()
            .find(|grant| grant.id == grant_id)
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}' does not exist")))?;
        grant.permission_level = level;
        Ok(())
    }

    async fn deactivate(&self, grant_id: GrantId) -> AppResult<()> {
        let mut grants = self.grants.write().await;
        let grant = grants
            .iter_mut()
            .find(|grant| grant.id == grant_id)
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}' does not exist")))?;
        grant.active = false;
        Ok(())
    }

    async fn references_principal(&self, principal: PrincipalRef) -> AppResult<bool> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .any(|grant| grant.principal == principal))
    }

    async fn deactivate_for_principal(&self, principal: PrincipalRef) -> AppResult<u64> {
        let mut grants = self.grants.write().await;
        let mut deactivated = 0;
        for grant in grants.iter_mut() {
            if grant.active && grant.principal == principal {
                grant.active = false;
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }
}
