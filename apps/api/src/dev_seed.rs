//! Local development fixtures: the built-in roles, their hierarchy, a few
//! users, and two diagrams to share.

use std::collections::BTreeSet;

use diagrid_application::HierarchyStore;
use diagrid_core::AppResult;
use diagrid_domain::{
    DiagramId, DiagramRef, GroupDefinition, GroupId, RoleDefinition, RoleId, RoleName, SystemRole,
    UserAccount, UserId,
};
use diagrid_infrastructure::{InMemoryDiagramDirectory, InMemoryDirectoryRepository, InMemoryHierarchyStore};
use tracing::info;

fn built_in_role(system_role: SystemRole, display_name: &str) -> AppResult<RoleDefinition> {
    Ok(RoleDefinition {
        id: RoleId::new(),
        name: RoleName::new(system_role.name())?,
        display_name: display_name.to_owned(),
        description: None,
    })
}

fn seeded_user(username: &str, display_name: &str, roles: &[RoleId]) -> UserAccount {
    UserAccount {
        id: UserId::new(),
        username: username.to_owned(),
        display_name: display_name.to_owned(),
        role_ids: roles.iter().copied().collect(),
        enabled: true,
    }
}

/// Seeds the directory and the role hierarchy.
pub async fn seed_directory(
    directory: &InMemoryDirectoryRepository,
    hierarchy: &InMemoryHierarchyStore,
) -> AppResult<()> {
    let admin = built_in_role(SystemRole::Admin, "Administrator")?;
    let modeler = built_in_role(SystemRole::Modeler, "Modeler")?;
    let viewer = built_in_role(SystemRole::Viewer, "Viewer")?;

    hierarchy.insert_edge(admin.id, modeler.id, 1).await?;
    hierarchy.insert_edge(modeler.id, viewer.id, 2).await?;

    let root = seeded_user("admin", "Site Admin", &[admin.id]);
    let mara = seeded_user("mara", "Mara Lindqvist", &[modeler.id]);
    let vik = seeded_user("vik", "Vik Osei", &[viewer.id]);

    let reviewers = GroupDefinition {
        id: GroupId::new(),
        name: "reviewers".to_owned(),
        description: Some("Process reviewers".to_owned()),
        active: true,
        member_user_ids: BTreeSet::from([vik.id]),
    };

    for role in [admin, modeler, viewer] {
        directory.seed_role(role).await;
    }
    for user in [root, mara, vik] {
        directory.seed_user(user).await;
    }
    directory.seed_group(reviewers).await;

    info!("seeded development directory: 3 roles, 3 users, 1 group");
    Ok(())
}

/// Seeds a couple of diagrams against the in-memory catalog.
pub async fn seed_diagrams(diagrams: &InMemoryDiagramDirectory) -> AppResult<()> {
    for (id, owner) in [("d-onboarding", "mara"), ("d-billing", "admin")] {
        diagrams
            .seed_diagram(DiagramRef {
                id: DiagramId::new(id)?,
                owner_username: owner.to_owned(),
            })
            .await;
    }

    info!("seeded development diagrams");
    Ok(())
}
