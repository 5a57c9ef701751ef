use std::str::FromStr;

use diagrid_core::AppError;
use serde::{Deserialize, Serialize};

/// Permission tier a grant confers on one diagram.
///
/// Totally ordered: `View < Edit < Admin`. Resolution always combines
/// applicable grants by taking the maximum, never an intersection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum PermissionLevel {
    /// Read-only access to the diagram.
    View,
    /// Modify the diagram's content.
    Edit,
    /// Full control including sharing the diagram with others.
    Admin,
}

impl PermissionLevel {
    /// Returns the stable wire code for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Edit => "EDIT",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "VIEW" => Ok(Self::View),
            "EDIT" => Ok(Self::Edit),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "unknown permission level '{value}'"
            ))),
        }
    }
}

/// Kind of principal a grant can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrincipalType {
    /// A single user account.
    User,
    /// A group of users.
    Group,
    /// A role, including everything it subsumes through the hierarchy.
    Role,
}

impl PrincipalType {
    /// Returns the stable wire code for this principal type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Group => "GROUP",
            Self::Role => "ROLE",
        }
    }
}

impl FromStr for PrincipalType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "USER" => Ok(Self::User),
            "GROUP" => Ok(Self::Group),
            "ROLE" => Ok(Self::Role),
            _ => Err(AppError::Validation(format!(
                "unknown principal type '{value}'"
            ))),
        }
    }
}

/// Built-in roles every installation carries.
///
/// Custom roles beyond these are ordinary directory rows; predicates over role
/// names go through this enumeration instead of ad hoc string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemRole {
    /// The distinguished global administrator role.
    Admin,
    /// Creates and edits diagrams.
    Modeler,
    /// Views shared diagrams.
    Viewer,
}

impl SystemRole {
    /// Returns the unique role name of this built-in role.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Modeler => "MODELER",
            Self::Viewer => "VIEWER",
        }
    }
}

/// Stable audit actions emitted by administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a diagram grant is created.
    GrantCreated,
    /// Emitted when a grant's permission level changes.
    GrantPermissionUpdated,
    /// Emitted when a grant is deactivated.
    GrantDeactivated,
    /// Emitted when a role hierarchy edge is inserted.
    HierarchyEdgeCreated,
    /// Emitted when a role hierarchy edge is removed.
    HierarchyEdgeDeleted,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is renamed.
    RoleRenamed,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a group is created.
    GroupCreated,
    /// Emitted when a group is deleted with cascading deactivation.
    GroupDeleted,
    /// Emitted when a user is added to a group.
    GroupMemberAdded,
    /// Emitted when a user is removed from a group.
    GroupMemberRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrantCreated => "access.grant.created",
            Self::GrantPermissionUpdated => "access.grant.permission_updated",
            Self::GrantDeactivated => "access.grant.deactivated",
            Self::HierarchyEdgeCreated => "access.hierarchy.edge_created",
            Self::HierarchyEdgeDeleted => "access.hierarchy.edge_deleted",
            Self::RoleCreated => "access.role.created",
            Self::RoleRenamed => "access.role.renamed",
            Self::RoleDeleted => "access.role.deleted",
            Self::GroupCreated => "access.group.created",
            Self::GroupDeleted => "access.group.deleted",
            Self::GroupMemberAdded => "access.group.member_added",
            Self::GroupMemberRemoved => "access.group.member_removed",
        }
    }
}
