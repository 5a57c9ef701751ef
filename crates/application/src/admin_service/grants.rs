use super::*;

use chrono::Utc;
use diagrid_domain::{AuditAction, DiagramGrant, DiagramId, GrantId, PermissionLevel};

use crate::AuditEvent;

/// Input payload for creating a diagram grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGrantInput {
    /// Diagram the grant applies to.
    pub diagram_id: DiagramId,
    /// Principal the grant targets.
    pub principal: PrincipalRef,
    /// Permission tier to confer.
    pub permission_level: PermissionLevel,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl AccessAdminService {
    /// Creates an active grant after validating the principal.
    ///
    /// Duplicate grants to the same principal are legal; the max-rule at
    /// resolution time makes them harmless.
    pub async fn create_grant(
        &self,
        actor: &UserIdentity,
        input: CreateGrantInput,
    ) -> AppResult<DiagramGrant> {
        let principal_label = self.require_active_principal(input.principal).await?;

        let grant = DiagramGrant {
            id: GrantId::new(),
            diagram_id: input.diagram_id,
            principal: input.principal,
            permission_level: input.permission_level,
            granted_by: actor.username().to_owned(),
            granted_at: Utc::now(),
            notes: input.notes,
            active: true,
        };

        self.grants.create(grant.clone()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GrantCreated,
                resource_type: "diagram_grant".to_owned(),
                resource_id: grant.id.to_string(),
                detail: Some(format!(
                    "granted {} on diagram '{}' to {principal_label}",
                    grant.permission_level.as_str(),
                    grant.diagram_id
                )),
            })
            .await?;

        Ok(grant)
    }

    /// Changes a grant's permission level in place.
    pub async fn update_grant_permission(
        &self,
        actor: &UserIdentity,
        grant_id: GrantId,
        new_level: PermissionLevel,
    ) -> AppResult<()> {
        let grant = self
            .grants
            .find(grant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}' does not exist")))?;

        self.grants.update_permission(grant_id, new_level).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GrantPermissionUpdated,
                resource_type: "diagram_grant".to_owned(),
                resource_id: grant_id.to_string(),
                detail: Some(format!(
                    "changed level from {} to {} on diagram '{}'",
                    grant.permission_level.as_str(),
                    new_level.as_str(),
                    grant.diagram_id
                )),
            })
            .await
    }

    /// Deactivates a grant; the row is kept for audit. No cascading effects.
    pub async fn deactivate_grant(&self, actor: &UserIdentity, grant_id: GrantId) -> AppResult<()> {
        let grant = self
            .grants
            .find(grant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}' does not exist")))?;

        self.grants.deactivate(grant_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GrantDeactivated,
                resource_type: "diagram_grant".to_owned(),
                resource_id: grant_id.to_string(),
                detail: Some(format!("deactivated grant on diagram '{}'", grant.diagram_id)),
            })
            .await
    }

    /// Lists all grants for a diagram, including inactive ones, for the
    /// sharing management surface.
    pub async fn list_grants_for_diagram(
        &self,
        diagram_id: &DiagramId,
    ) -> AppResult<Vec<DiagramGrant>> {
        self.grants.list_for_diagram(diagram_id).await
    }
}
