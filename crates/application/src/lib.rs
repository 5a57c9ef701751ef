//! Application services and ports for diagram access control.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod admin_service;
mod audit;
mod guard;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    DiagramDirectory, DirectoryRepository, GrantRepository, HierarchyStore,
};
pub use access_service::AccessService;
pub use admin_service::{
    AccessAdminService, CreateGrantInput, CreateGroupInput, CreateRoleInput,
};
pub use audit::{AuditEvent, AuditRepository};
pub use guard::{
    AccessGuard, CallerContext, Decision, DenyReason, GuardConfig, GuardEvaluation, GuardTarget,
    ResourceRequirement, RoleRequirement,
};
