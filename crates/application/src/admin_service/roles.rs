use super::*;

use diagrid_domain::{AuditAction, RoleDefinition, RoleId, RoleName};

use crate::AuditEvent;

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: RoleName,
    /// Human-readable display name.
    pub display_name: String,
    /// Free-form description.
    pub description: Option<String>,
}

impl AccessAdminService {
    /// Lists all roles for the administration surface.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.directory.list_roles().await
    }

    /// Creates a role with a unique name.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        if self.directory.find_role_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let role = RoleDefinition {
            id: RoleId::new(),
            name: input.name,
            display_name: input.display_name,
            description: input.description,
        };

        self.directory.create_role(role.clone()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::RoleCreated,
                resource_type: "role".to_owned(),
                resource_id: role.id.to_string(),
                detail: Some(format!("created role '{}'", role.name)),
            })
            .await?;

        Ok(role)
    }

    /// Renames a role. Identity stays stable, so hierarchy edges and grants
    /// referencing the role are unaffected.
    pub async fn rename_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        new_name: RoleName,
        new_display_name: String,
    ) -> AppResult<()> {
        let role = self
            .directory
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        if role.name != new_name
            && self.directory.find_role_by_name(&new_name).await?.is_some()
        {
            return Err(AppError::Conflict(format!(
                "role '{new_name}' already exists"
            )));
        }

        self.directory
            .rename_role(role_id, new_name.clone(), new_display_name)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::RoleRenamed,
                resource_type: "role".to_owned(),
                resource_id: role_id.to_string(),
                detail: Some(format!("renamed role '{}' to '{new_name}'", role.name)),
            })
            .await
    }

    /// Deletes a role that nothing references.
    ///
    /// Any hierarchy edge or grant referencing the role blocks deletion,
    /// inactive grants included.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<()> {
        let role = self
            .directory
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        if self.hierarchy.references_role(role_id).await? {
            return Err(AppError::RoleInUse(format!(
                "role '{}' participates in the hierarchy",
                role.name
            )));
        }

        if self
            .grants
            .references_principal(PrincipalRef::Role(role_id))
            .await?
        {
            return Err(AppError::RoleInUse(format!(
                "role '{}' is referenced by grants",
                role.name
            )));
        }

        self.directory.delete_role(role_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::RoleDeleted,
                resource_type: "role".to_owned(),
                resource_id: role_id.to_string(),
                detail: Some(format!("deleted role '{}'", role.name)),
            })
            .await
    }
}
