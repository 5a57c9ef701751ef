use std::sync::Arc;

use diagrid_core::{AppError, UserIdentity};
use diagrid_domain::{AuditAction, PermissionLevel, PrincipalRef, RoleId, RoleName};
use uuid::Uuid;

use super::{AccessAdminService, CreateGrantInput, CreateGroupInput, CreateRoleInput};
use crate::access_ports::DirectoryRepository;
use crate::test_support::{
    MemoryAudit, MemoryDirectory, MemoryGrants, MemoryHierarchy, active_grant, diagram_id,
    group_named, role_named, user_named,
};

struct Harness {
    directory: Arc<MemoryDirectory>,
    hierarchy: Arc<MemoryHierarchy>,
    grants: Arc<MemoryGrants>,
    audit: Arc<MemoryAudit>,
    service: AccessAdminService,
}

fn harness() -> Harness {
    let directory = Arc::new(MemoryDirectory::default());
    let hierarchy = Arc::new(MemoryHierarchy::default());
    let grants = Arc::new(MemoryGrants::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = AccessAdminService::new(
        directory.clone(),
        hierarchy.clone(),
        grants.clone(),
        audit.clone(),
    );

    Harness {
        directory,
        hierarchy,
        grants,
        audit,
        service,
    }
}

fn actor() -> UserIdentity {
    UserIdentity::new(Uuid::new_v4(), "root", "Root")
}

fn role_name(name: &str) -> RoleName {
    RoleName::new(name).unwrap_or_else(|_| unreachable!("test role names are non-empty"))
}

fn grant_input(principal: PrincipalRef, level: PermissionLevel) -> CreateGrantInput {
    CreateGrantInput {
        diagram_id: diagram_id("d1"),
        principal,
        permission_level: level,
        notes: None,
    }
}

#[tokio::test]
async fn create_grant_rejects_disabled_user_principal() {
    let harness = harness();
    let mut user = user_named("alice", []);
    user.enabled = false;
    harness.directory.insert_user(user.clone()).await;

    let result = harness
        .service
        .create_grant(
            &actor(),
            grant_input(PrincipalRef::User(user.id), PermissionLevel::View),
        )
        .await;
    assert!(matches!(result, Err(AppError::PrincipalNotFound(_))));
    assert!(harness.grants.grants.lock().await.is_empty());
}

#[tokio::test]
async fn create_grant_rejects_inactive_group_principal() {
    let harness = harness();
    let mut group = group_named("disbanded", []);
    group.active = false;
    harness.directory.insert_group(group.clone()).await;

    let result = harness
        .service
        .create_grant(
            &actor(),
            grant_input(PrincipalRef::Group(group.id), PermissionLevel::Edit),
        )
        .await;
    assert!(matches!(result, Err(AppError::PrincipalNotFound(_))));
}

#[tokio::test]
async fn create_grant_rejects_missing_role_principal() {
    let harness = harness();

    let result = harness
        .service
        .create_grant(
            &actor(),
            grant_input(PrincipalRef::Role(RoleId::new()), PermissionLevel::View),
        )
        .await;
    assert!(matches!(result, Err(AppError::PrincipalNotFound(_))));
}

#[tokio::test]
async fn create_grant_persists_and_audits() {
    let harness = harness();
    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;

    let result = harness
        .service
        .create_grant(
            &actor(),
            grant_input(PrincipalRef::User(user.id), PermissionLevel::Edit),
        )
        .await
        .ok();

    let grant = match result {
        Some(grant) => grant,
        None => panic!("grant creation must succeed"),
    };
    assert!(grant.active);
    assert_eq!(grant.granted_by, "root");

    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::GrantCreated);
    assert_eq!(events[0].subject, "root");
}

#[tokio::test]
async fn duplicate_grants_to_the_same_principal_are_legal() {
    let harness = harness();
    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;

    for level in [PermissionLevel::View, PermissionLevel::Admin] {
        let created = harness
            .service
            .create_grant(&actor(), grant_input(PrincipalRef::User(user.id), level))
            .await;
        assert!(created.is_ok());
    }

    assert_eq!(harness.grants.grants.lock().await.len(), 2);
}

#[tokio::test]
async fn update_grant_permission_requires_an_existing_grant() {
    let harness = harness();

    let result = harness
        .service
        .update_grant_permission(&actor(), diagrid_domain::GrantId::new(), PermissionLevel::Edit)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn update_grant_permission_changes_the_level_in_place() {
    let harness = harness();
    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;

    let grant = active_grant(
        &diagram_id("d1"),
        PrincipalRef::User(user.id),
        PermissionLevel::View,
    );
    harness.grants.insert(grant.clone()).await;

    let updated = harness
        .service
        .update_grant_permission(&actor(), grant.id, PermissionLevel::Admin)
        .await;
    assert!(updated.is_ok());

    let stored = harness.grants.grants.lock().await;
    assert_eq!(stored[0].permission_level, PermissionLevel::Admin);
}

#[tokio::test]
async fn deactivate_grant_keeps_the_row_for_audit() {
    let harness = harness();
    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;

    let grant = active_grant(
        &diagram_id("d1"),
        PrincipalRef::User(user.id),
        PermissionLevel::View,
    );
    harness.grants.insert(grant.clone()).await;

    let result = harness.service.deactivate_grant(&actor(), grant.id).await;
    assert!(result.is_ok());

    let stored = harness.grants.grants.lock().await;
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].active);
}

#[tokio::test]
async fn cycle_creating_edge_is_reported_with_role_names() {
    let harness = harness();
    let admin = role_named("ADMIN");
    let modeler = role_named("MODELER");
    harness.directory.insert_role(admin.clone()).await;
    harness.directory.insert_role(modeler.clone()).await;

    let created = harness
        .service
        .create_hierarchy_edge(&actor(), admin.id, modeler.id, 1)
        .await;
    assert!(created.is_ok());

    let reversed = harness
        .service
        .create_hierarchy_edge(&actor(), modeler.id, admin.id, 1)
        .await;
    match reversed {
        Err(AppError::HierarchyCycle { path }) => {
            assert!(path.contains(&"ADMIN".to_owned()));
            assert!(path.contains(&"MODELER".to_owned()));
        }
        other => panic!("expected a cycle rejection, got {other:?}"),
    }

    // The rejected edge must not have been applied.
    let graph = harness.hierarchy.graph.lock().await;
    assert!(!graph.contains_edge(modeler.id, admin.id));
}

#[tokio::test]
async fn hierarchy_edge_requires_existing_roles() {
    let harness = harness();
    let admin = role_named("ADMIN");
    harness.directory.insert_role(admin.clone()).await;

    let result = harness
        .service
        .create_hierarchy_edge(&actor(), admin.id, RoleId::new(), 1)
        .await;
    assert!(matches!(result, Err(AppError::PrincipalNotFound(_))));
}

#[tokio::test]
async fn deleting_an_absent_hierarchy_edge_is_not_an_error() {
    let harness = harness();

    let result = harness
        .service
        .delete_hierarchy_edge(&actor(), RoleId::new(), RoleId::new())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn create_role_rejects_duplicate_names() {
    let harness = harness();
    let existing = role_named("MODELER");
    harness.directory.insert_role(existing).await;

    let result = harness
        .service
        .create_role(
            &actor(),
            CreateRoleInput {
                name: role_name("MODELER"),
                display_name: "Modeler".to_owned(),
                description: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn rename_role_rejects_taken_names_but_allows_same_name() {
    let harness = harness();
    let auditor = role_named("AUDITOR");
    let reviewer = role_named("REVIEWER");
    harness.directory.insert_role(auditor.clone()).await;
    harness.directory.insert_role(reviewer.clone()).await;

    let taken = harness
        .service
        .rename_role(&actor(), auditor.id, role_name("REVIEWER"), "Reviewer".to_owned())
        .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    // Keeping the name while changing the display name is not a conflict.
    let same = harness
        .service
        .rename_role(&actor(), auditor.id, role_name("AUDITOR"), "Lead Auditor".to_owned())
        .await;
    assert!(same.is_ok());

    let stored = harness.directory.find_role_by_id(auditor.id).await.ok().flatten();
    assert_eq!(
        stored.map(|role| role.display_name),
        Some("Lead Auditor".to_owned())
    );
}

#[tokio::test]
async fn delete_role_is_blocked_by_hierarchy_references() {
    let harness = harness();
    let admin = role_named("ADMIN");
    let modeler = role_named("MODELER");
    harness.directory.insert_role(admin.clone()).await;
    harness.directory.insert_role(modeler.clone()).await;
    harness
        .hierarchy
        .graph
        .lock()
        .await
        .insert_edge(admin.id, modeler.id, 1)
        .ok();

    let result = harness.service.delete_role(&actor(), modeler.id).await;
    assert!(matches!(result, Err(AppError::RoleInUse(_))));
}

#[tokio::test]
async fn delete_role_is_blocked_by_inactive_grant_references() {
    let harness = harness();
    let role = role_named("AUDITOR");
    harness.directory.insert_role(role.clone()).await;

    let mut grant = active_grant(
        &diagram_id("d1"),
        PrincipalRef::Role(role.id),
        PermissionLevel::View,
    );
    grant.active = false;
    harness.grants.insert(grant).await;

    let result = harness.service.delete_role(&actor(), role.id).await;
    assert!(matches!(result, Err(AppError::RoleInUse(_))));
}

#[tokio::test]
async fn delete_role_succeeds_when_nothing_references_it() {
    let harness = harness();
    let role = role_named("AUDITOR");
    harness.directory.insert_role(role.clone()).await;

    let result = harness.service.delete_role(&actor(), role.id).await;
    assert!(result.is_ok());
    assert!(harness.directory.find_role_by_id(role.id).await.ok().flatten().is_none());
}

#[tokio::test]
async fn delete_group_cascades_membership_and_grants() {
    let harness = harness();
    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;
    let group = group_named("designers", [user.id]);
    harness.directory.insert_group(group.clone()).await;

    harness
        .grants
        .insert(active_grant(
            &diagram_id("d1"),
            PrincipalRef::Group(group.id),
            PermissionLevel::Edit,
        ))
        .await;

    let result = harness.service.delete_group(&actor(), group.id).await;
    assert!(result.is_ok());

    let stored = harness.directory.find_group_by_id(group.id).await.ok().flatten();
    match stored {
        Some(group) => {
            assert!(!group.active);
            assert!(group.member_user_ids.is_empty());
        }
        None => panic!("group row must survive deactivation"),
    }

    let grants = harness.grants.grants.lock().await;
    assert!(!grants[0].active);

    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::GroupDeleted);
    assert_eq!(
        events[0].detail.as_deref(),
        Some("deleted group 'designers', deactivating 1 grant(s)")
    );
}

#[tokio::test]
async fn add_group_member_validates_both_sides() {
    let harness = harness();
    let group = group_named("designers", []);
    harness.directory.insert_group(group.clone()).await;

    let mut disabled = user_named("mallory", []);
    disabled.enabled = false;
    harness.directory.insert_user(disabled.clone()).await;

    let result = harness
        .service
        .add_group_member(&actor(), group.id, disabled.id)
        .await;
    assert!(matches!(result, Err(AppError::PrincipalNotFound(_))));

    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;
    let added = harness.service.add_group_member(&actor(), group.id, user.id).await;
    assert!(added.is_ok());

    let stored = harness.directory.find_group_by_id(group.id).await.ok().flatten();
    assert_eq!(stored.map(|group| group.has_member(user.id)), Some(true));
}

#[tokio::test]
async fn remove_group_member_clears_the_membership() {
    let harness = harness();
    let user = user_named("alice", []);
    harness.directory.insert_user(user.clone()).await;
    let group = group_named("designers", [user.id]);
    harness.directory.insert_group(group.clone()).await;

    let result = harness
        .service
        .remove_group_member(&actor(), group.id, user.id)
        .await;
    assert!(result.is_ok());

    let stored = harness.directory.find_group_by_id(group.id).await.ok().flatten();
    assert_eq!(stored.map(|group| group.has_member(user.id)), Some(false));
}

#[tokio::test]
async fn create_group_starts_active_and_empty() {
    let harness = harness();

    let created = harness
        .service
        .create_group(
            &actor(),
            CreateGroupInput {
                name: "designers".to_owned(),
                description: None,
            },
        )
        .await
        .ok();

    match created {
        Some(group) => {
            assert!(group.active);
            assert!(group.member_user_ids.is_empty());
        }
        None => panic!("group creation must succeed"),
    }
}
