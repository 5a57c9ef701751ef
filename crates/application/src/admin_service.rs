//! Administration operations: validated mutators over grants, the role
//! hierarchy, roles, groups, and group membership.
//!
//! Callers are expected to have been authorized at ADMIN level already (the
//! API layer guards the admin routes); the service validates structure and
//! referential integrity, not the caller.

use std::sync::Arc;

use diagrid_core::{AppError, AppResult, UserIdentity};
use diagrid_domain::{PrincipalRef, RoleTreeNode};
use uuid::Uuid;

use crate::access_ports::{DirectoryRepository, GrantRepository, HierarchyStore};
use crate::audit::AuditRepository;

mod grants;
mod groups;
mod hierarchy;
mod roles;

#[cfg(test)]
mod tests;

pub use grants::CreateGrantInput;
pub use groups::CreateGroupInput;
pub use roles::CreateRoleInput;

/// Application service for access-control administration.
pub struct AccessAdminService {
    directory: Arc<dyn DirectoryRepository>,
    hierarchy: Arc<dyn HierarchyStore>,
    grants: Arc<dyn GrantRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AccessAdminService {
    /// Creates the service from port implementations.
    #[must_use]
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        hierarchy: Arc<dyn HierarchyStore>,
        grants: Arc<dyn GrantRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            directory,
            hierarchy,
            grants,
            audit_repository,
        }
    }

    /// Produces the display-only forest view of the role hierarchy.
    pub async fn role_tree(&self) -> AppResult<Vec<RoleTreeNode>> {
        Ok(self.hierarchy.load().await?.tree())
    }

    /// Validates that a grant or membership principal exists and is active,
    /// returning a label for audit detail.
    async fn require_active_principal(&self, principal: PrincipalRef) -> AppResult<String> {
        match principal {
            PrincipalRef::User(user_id) => {
                let user = self
                    .directory
                    .find_user_by_id(user_id)
                    .await?
                    .filter(|user| user.enabled)
                    .ok_or_else(|| {
                        AppError::PrincipalNotFound(format!(
                            "user '{user_id}' does not exist or is disabled"
                        ))
                    })?;
                Ok(format!("user '{}'", user.username))
            }
            PrincipalRef::Group(group_id) => {
                let group = self
                    .directory
                    .find_group_by_id(group_id)
                    .await?
                    .filter(|group| group.active)
                    .ok_or_else(|| {
                        AppError::PrincipalNotFound(format!(
                            "group '{group_id}' does not exist or is inactive"
                        ))
                    })?;
                Ok(format!("group '{}'", group.name))
            }
            PrincipalRef::Role(role_id) => {
                let role = self
                    .directory
                    .find_role_by_id(role_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::PrincipalNotFound(format!("role '{role_id}' does not exist"))
                    })?;
                Ok(format!("role '{}'", role.name))
            }
        }
    }

    /// Rewrites a cycle error's role-id path into role names where known.
    async fn name_cycle_path(&self, path: Vec<String>) -> Vec<String> {
        let mut named = Vec::with_capacity(path.len());
        for entry in path {
            let name = match Uuid::parse_str(&entry) {
                Ok(id) => self
                    .directory
                    .find_role_by_id(diagrid_domain::RoleId::from_uuid(id))
                    .await
                    .ok()
                    .flatten()
                    .map(|role| role.name.as_str().to_owned()),
                Err(_) => None,
            };
            named.push(name.unwrap_or(entry));
        }

        named
    }

    fn actor_subject(actor: &UserIdentity) -> String {
        actor.username().to_owned()
    }
}
