use super::*;

use std::collections::BTreeSet;

use diagrid_domain::{AuditAction, GroupDefinition, GroupId, UserId};

use crate::AuditEvent;

/// Input payload for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupInput {
    /// Unique group name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
}

impl AccessAdminService {
    /// Lists all groups for the administration surface.
    pub async fn list_groups(&self) -> AppResult<Vec<GroupDefinition>> {
        self.directory.list_groups().await
    }

    /// Creates an active group with no members.
    pub async fn create_group(
        &self,
        actor: &UserIdentity,
        input: CreateGroupInput,
    ) -> AppResult<GroupDefinition> {
        let group = GroupDefinition {
            id: GroupId::new(),
            name: input.name,
            description: input.description,
            active: true,
            member_user_ids: BTreeSet::new(),
        };

        self.directory.create_group(group.clone()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GroupCreated,
                resource_type: "group".to_owned(),
                resource_id: group.id.to_string(),
                detail: Some(format!("created group '{}'", group.name)),
            })
            .await?;

        Ok(group)
    }

    /// Deletes a group with cascading deactivation: memberships are removed
    /// and every grant targeting the group is deactivated.
    pub async fn delete_group(&self, actor: &UserIdentity, group_id: GroupId) -> AppResult<()> {
        let group = self
            .directory
            .find_group_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))?;

        self.directory.deactivate_group(group_id).await?;
        let deactivated_grants = self
            .grants
            .deactivate_for_principal(PrincipalRef::Group(group_id))
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GroupDeleted,
                resource_type: "group".to_owned(),
                resource_id: group_id.to_string(),
                detail: Some(format!(
                    "deleted group '{}', deactivating {deactivated_grants} grant(s)",
                    group.name
                )),
            })
            .await
    }

    /// Adds a user to a group after validating both sides.
    pub async fn add_group_member(
        &self,
        actor: &UserIdentity,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<()> {
        let user_label = self.require_active_principal(PrincipalRef::User(user_id)).await?;
        let group_label = self
            .require_active_principal(PrincipalRef::Group(group_id))
            .await?;

        self.directory.add_group_member(group_id, user_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GroupMemberAdded,
                resource_type: "group_membership".to_owned(),
                resource_id: format!("{group_id}:{user_id}"),
                detail: Some(format!("added {user_label} to {group_label}")),
            })
            .await
    }

    /// Removes a user from a group.
    pub async fn remove_group_member(
        &self,
        actor: &UserIdentity,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<()> {
        let group_label = self
            .require_active_principal(PrincipalRef::Group(group_id))
            .await?;

        self.directory.remove_group_member(group_id, user_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: Self::actor_subject(actor),
                action: AuditAction::GroupMemberRemoved,
                resource_type: "group_membership".to_owned(),
                resource_id: format!("{group_id}:{user_id}"),
                detail: Some(format!("removed user '{user_id}' from {group_label}")),
            })
            .await
    }
}
