//! Domain entities and invariants for diagram access control.

#![forbid(unsafe_code)]

mod access;
mod grant;
mod hierarchy;
mod principal;
mod security;

pub use access::{AccessInfo, RoleCatalog, resolve_access};
pub use grant::{DiagramGrant, PrincipalRef};
pub use hierarchy::{RoleHierarchyEdge, RoleHierarchyGraph, RoleTreeNode};
pub use principal::{
    DiagramId, DiagramRef, GrantId, GroupDefinition, GroupId, RoleDefinition, RoleId, RoleName,
    UserAccount, UserId,
};
pub use security::{AuditAction, PermissionLevel, PrincipalType, SystemRole};
