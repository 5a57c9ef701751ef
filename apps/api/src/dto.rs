//! Wire types for the access-control API.

use chrono::{DateTime, Utc};
use diagrid_domain::{
    AccessInfo, DiagramGrant, GrantId, GroupDefinition, GroupId, PermissionLevel, PrincipalRef,
    RoleDefinition, RoleId, RoleTreeNode, UserId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UserIdentityResponse {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessInfoResponse {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_assign: bool,
    pub permission_level: Option<PermissionLevel>,
}

impl From<AccessInfo> for AccessInfoResponse {
    fn from(value: AccessInfo) -> Self {
        Self {
            can_view: value.can_view,
            can_edit: value.can_edit,
            can_assign: value.can_assign,
            permission_level: value.permission_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub id: GrantId,
    pub diagram_id: String,
    pub principal: PrincipalRef,
    pub permission_level: PermissionLevel,
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub active: bool,
}

impl From<DiagramGrant> for GrantResponse {
    fn from(value: DiagramGrant) -> Self {
        Self {
            id: value.id,
            diagram_id: value.diagram_id.to_string(),
            principal: value.principal,
            permission_level: value.permission_level,
            granted_by: value.granted_by,
            granted_at: value.granted_at,
            notes: value.notes,
            active: value.active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGrantRequest {
    pub principal: PrincipalRef,
    pub permission_level: PermissionLevel,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGrantPermissionRequest {
    pub permission_level: PermissionLevel,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            id: value.id,
            name: value.name.as_str().to_owned(),
            display_name: value.display_name,
            description: value.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRoleRequest {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateHierarchyEdgeRequest {
    pub parent_id: RoleId,
    pub child_id: RoleId,
    #[serde(default)]
    pub hierarchy_level: i32,
}

#[derive(Debug, Serialize)]
pub struct RoleTreeNodeResponse {
    pub role_id: RoleId,
    pub children: Vec<RoleTreeNodeResponse>,
}

impl From<RoleTreeNode> for RoleTreeNodeResponse {
    fn from(value: RoleTreeNode) -> Self {
        Self {
            role_id: value.role,
            children: value.children.into_iter().map(Self::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub member_user_ids: Vec<UserId>,
}

impl From<GroupDefinition> for GroupResponse {
    fn from(value: GroupDefinition) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            active: value.active,
            member_user_ids: value.member_user_ids.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}
