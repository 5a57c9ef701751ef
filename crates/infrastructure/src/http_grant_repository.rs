use async_trait::async_trait;
use diagrid_application::GrantRepository;
use diagrid_core::AppResult;
use diagrid_domain::{DiagramGrant, DiagramId, GrantId, PermissionLevel, PrincipalRef};
use serde::{Deserialize, Serialize};

use crate::persistence_client::PersistenceClient;

/// Grant store backed by the Persistence API.
#[derive(Debug, Clone)]
pub struct HttpGrantRepository {
    client: PersistenceClient,
}

#[derive(Debug, Serialize)]
struct UpdatePermissionBody {
    permission_level: PermissionLevel,
}

#[derive(Debug, Serialize)]
struct DeactivateBody {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct ReferencedBody {
    referenced: bool,
}

#[derive(Debug, Deserialize)]
struct DeactivatedBody {
    deactivated: u64,
}

impl HttpGrantRepository {
    /// Creates a grant repository over the shared client.
    #[must_use]
    pub fn new(client: PersistenceClient) -> Self {
        Self { client }
    }

    fn principal_path(principal: PrincipalRef) -> String {
        format!(
            "grants/by-principal/{}/{}",
            principal.principal_type().as_str(),
            principal.principal_uuid()
        )
    }
}

#[async_trait]
impl GrantRepository for HttpGrantRepository {
    async fn list_active_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>> {
        self.client
            .get(&format!("diagrams/{diagram_id}/grants?active_only=true"))
            .await
    }

    async fn list_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>> {
        self.client
            .get(&format!("diagrams/{diagram_id}/grants"))
            .await
    }

    async fn find(&self, grant_id: GrantId) -> AppResult<Option<DiagramGrant>> {
        self.client.get_optional(&format!("grants/{grant_id}")).await
    }

    async fn create(&self, grant: DiagramGrant) -> AppResult<()> {
        self.client.post("grants", &grant).await
    }

    async fn update_permission(&self, grant_id: GrantId, level: PermissionLevel) -> AppResult<()> {
        self.client
            .put(
                &format!("grants/{grant_id}/permission"),
                &UpdatePermissionBody {
                    permission_level: level,
                },
            )
            .await
    }

    async fn deactivate(&self, grant_id: GrantId) -> AppResult<()> {
        self.client
            .put(
                &format!("grants/{grant_id}/active"),
                &DeactivateBody { active: false },
            )
            .await
    }

    async fn references_principal(&self, principal: PrincipalRef) -> AppResult<bool> {
        let body: ReferencedBody = self
            .client
            .get(&format!("{}/referenced", Self::principal_path(principal)))
            .await?;
        Ok(body.referenced)
    }

    async fn deactivate_for_principal(&self, principal: PrincipalRef) -> AppResult<u64> {
        let body: DeactivatedBody = self
            .client
            .post_returning(
                &format!("{}/deactivate", Self::principal_path(principal)),
                &DeactivateBody { active: false },
            )
            .await?;
        Ok(body.deactivated)
    }
}
