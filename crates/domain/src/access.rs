use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::grant::{DiagramGrant, PrincipalRef};
use crate::hierarchy::RoleHierarchyGraph;
use crate::principal::{DiagramRef, GroupId, RoleId, RoleName, UserAccount};
use crate::security::{PermissionLevel, SystemRole};

/// Known roles by id, used to name-check the global admin role and to drop
/// grants referencing deleted roles.
pub type RoleCatalog = BTreeMap<RoleId, RoleName>;

/// Effective access of one user to one diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessInfo {
    /// The user may open the diagram read-only.
    pub can_view: bool,
    /// The user may modify the diagram.
    pub can_edit: bool,
    /// The user may manage this diagram's own grants (sharing).
    pub can_assign: bool,
    /// Highest applicable permission level; `None` is the NONE tier.
    pub permission_level: Option<PermissionLevel>,
}

impl AccessInfo {
    /// Fail-closed default: no access at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            can_view: false,
            can_edit: false,
            can_assign: false,
            permission_level: None,
        }
    }

    /// Full access, as granted to owners and global administrators.
    #[must_use]
    pub fn full() -> Self {
        Self::from_level(Some(PermissionLevel::Admin))
    }

    /// Derives the capability booleans from a permission level.
    #[must_use]
    pub fn from_level(permission_level: Option<PermissionLevel>) -> Self {
        Self {
            can_view: permission_level >= Some(PermissionLevel::View),
            can_edit: permission_level >= Some(PermissionLevel::Edit),
            can_assign: permission_level >= Some(PermissionLevel::Admin),
            permission_level,
        }
    }
}

/// Resolves the effective permission of `user` on `diagram`.
///
/// Pure and side-effect free: the result depends only on the snapshot passed
/// in. Combination is permissive-union: the maximum level across applicable
/// grants wins, so adding a grant can only raise or preserve access.
///
/// Order of evaluation:
/// 1. disabled users resolve to no access;
/// 2. holders of the global admin role (directly or through the hierarchy
///    closure) get full access;
/// 3. the diagram's owner gets full access without a grant row;
/// 4. otherwise the maximum over active grants whose principal matches the
///    user, one of their active groups, or one of their effective roles.
///
/// Grants whose principal is missing from the snapshot (unknown role, group
/// the user does not actively belong to) are excluded before the maximum is
/// taken.
#[must_use]
pub fn resolve_access(
    user: &UserAccount,
    diagram: &DiagramRef,
    graph: &RoleHierarchyGraph,
    roles: &RoleCatalog,
    member_groups: &BTreeSet<GroupId>,
    grants: &[DiagramGrant],
) -> AccessInfo {
    if !user.enabled {
        return AccessInfo::none();
    }

    let effective_roles = graph.closure_of_all(user.role_ids.iter().copied());

    let is_global_admin = effective_roles
        .iter()
        .any(|role| roles.get(role).is_some_and(|name| name.as_str() == SystemRole::Admin.name()));
    if is_global_admin {
        return AccessInfo::full();
    }

    if diagram.owner_username == user.username {
        return AccessInfo::full();
    }

    let level = grants
        .iter()
        .filter(|grant| grant.active && grant.diagram_id == diagram.id)
        .filter(|grant| match grant.principal {
            PrincipalRef::User(id) => id == user.id,
            PrincipalRef::Group(id) => member_groups.contains(&id),
            PrincipalRef::Role(id) => {
                effective_roles.contains(&id) && roles.contains_key(&id)
            }
        })
        .map(|grant| grant.permission_level)
        .max();

    AccessInfo::from_level(level)
}
