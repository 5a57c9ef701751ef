use super::*;

use diagrid_domain::{AuditAction, RoleId};

use crate::AuditEvent;

impl AccessAdminService {
    /// Inserts a role hierarchy edge.
    ///
    /// Both roles must exist; self-edges and cycle-creating edges are
    /// rejected atomically by the store, with the cycle path reported as role
    /// names so the caller can correct the request.
    pub async fn create_hierarchy_edge(
        &self,
        actor: &UserIdentity,
        parent: RoleId,
        child: RoleId,
        level: i32,
    ) -> AppResult<()> {
        let parent_label = self.require_active_principal(PrincipalRef::Role(parent)).await?;
        let child_label = self.require_active_principal(PrincipalRef::Role(child)).await?;

        let inserted = self.hierarchy.insert_edge(parent, child, level).await;
        if let Err(AppError::HierarchyCycle { path }) = inserted {
            return Err(AppError::HierarchyCycle {
                path: self.name_cycle_path(path).await,
            });
        }
        inserted?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::HierarchyEdgeCreated,
                resource_type: "role_hierarchy_edge".to_owned(),
                resource_id: format!("{parent}:{child}"),
                detail: Some(format!("{parent_label} now subsumes {child_label}")),
            })
            .await
    }

    /// Removes a role hierarchy edge. Idempotent; removing an absent edge is
    /// not an error.
    pub async fn delete_hierarchy_edge(
        &self,
        actor: &UserIdentity,
        parent: RoleId,
        child: RoleId,
    ) -> AppResult<()> {
        self.hierarchy.remove_edge(parent, child).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::HierarchyEdgeDeleted,
                resource_type: "role_hierarchy_edge".to_owned(),
                resource_id: format!("{parent}:{child}"),
                detail: None,
            })
            .await
    }
}
