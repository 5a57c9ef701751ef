//! Ports onto the external Persistence API.
//!
//! The backing store is a remote service; these traits capture exactly the
//! operations this subsystem consumes and mutates. Adapters live in the
//! infrastructure crate.

use async_trait::async_trait;
use diagrid_core::AppResult;
use diagrid_domain::{
    DiagramGrant, DiagramId, DiagramRef, GrantId, GroupDefinition, GroupId, PermissionLevel,
    PrincipalRef, RoleDefinition, RoleHierarchyGraph, RoleId, RoleName, UserAccount, UserId,
};

/// Read/write access to users, roles, groups, and memberships.
///
/// Users and group membership are lifecycle-owned by the external identity
/// source; this subsystem reads them and only edits membership through the
/// administration operations.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Finds a user by id, including directly-held role ids and enabled flag.
    async fn find_user_by_id(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Finds a user by unique username.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserAccount>>;

    /// Finds a role by id.
    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>>;

    /// Finds a role by unique name.
    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>>;

    /// Lists all roles.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Finds a group by id.
    async fn find_group_by_id(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>>;

    /// Lists all groups.
    async fn list_groups(&self) -> AppResult<Vec<GroupDefinition>>;

    /// Lists the active groups the user currently belongs to.
    async fn groups_of_user(&self, user_id: UserId) -> AppResult<Vec<GroupDefinition>>;

    /// Creates a role.
    async fn create_role(&self, role: RoleDefinition) -> AppResult<()>;

    /// Renames a role; identity stays stable for existing references.
    async fn rename_role(
        &self,
        role_id: RoleId,
        name: RoleName,
        display_name: String,
    ) -> AppResult<()>;

    /// Deletes a role row. Reference checks happen before this is called.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Creates a group.
    async fn create_group(&self, group: GroupDefinition) -> AppResult<()>;

    /// Deactivates a group and removes its memberships.
    async fn deactivate_group(&self, group_id: GroupId) -> AppResult<()>;

    /// Adds a user to a group.
    async fn add_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()>;

    /// Removes a user from a group.
    async fn remove_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()>;
}

/// Linearizable store of the role hierarchy edge set.
///
/// Mutations are single-writer per graph so a concurrent cycle check and edge
/// insertion cannot race the edge set into a cycle.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// Loads a versioned snapshot of the current graph.
    async fn load(&self) -> AppResult<RoleHierarchyGraph>;

    /// Inserts an edge, enforcing the self-edge and cycle invariants
    /// atomically. On failure the stored graph is unchanged.
    async fn insert_edge(&self, parent: RoleId, child: RoleId, level: i32) -> AppResult<()>;

    /// Removes an edge; absent edges are ignored.
    async fn remove_edge(&self, parent: RoleId, child: RoleId) -> AppResult<()>;

    /// Returns whether any edge references the role.
    async fn references_role(&self, role: RoleId) -> AppResult<bool>;
}

/// Store of per-diagram access grants.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Lists active grants for one diagram.
    async fn list_active_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>>;

    /// Lists all grants for one diagram, including inactive ones.
    async fn list_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>>;

    /// Finds a grant by id.
    async fn find(&self, grant_id: GrantId) -> AppResult<Option<DiagramGrant>>;

    /// Appends a grant row.
    async fn create(&self, grant: DiagramGrant) -> AppResult<()>;

    /// Changes a grant's permission level in place.
    async fn update_permission(&self, grant_id: GrantId, level: PermissionLevel) -> AppResult<()>;

    /// Deactivates a grant; the row is kept for audit.
    async fn deactivate(&self, grant_id: GrantId) -> AppResult<()>;

    /// Returns whether any grant, active or inactive, targets the principal.
    async fn references_principal(&self, principal: PrincipalRef) -> AppResult<bool>;

    /// Deactivates every active grant targeting the principal; returns the
    /// number of grants deactivated.
    async fn deactivate_for_principal(&self, principal: PrincipalRef) -> AppResult<u64>;
}

/// Read-only view onto the external Diagram Editor Surface.
#[async_trait]
pub trait DiagramDirectory: Send + Sync {
    /// Returns the diagram's id and ownership field.
    async fn find_diagram(&self, diagram_id: &DiagramId) -> AppResult<Option<DiagramRef>>;
}
