//! Shared fake port implementations for service tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use diagrid_core::{AppError, AppResult};
use diagrid_domain::{
    DiagramGrant, DiagramId, DiagramRef, GrantId, GroupDefinition, GroupId, PermissionLevel,
    PrincipalRef, RoleDefinition, RoleHierarchyGraph, RoleId, RoleName, UserAccount, UserId,
};
use tokio::sync::Mutex;

use crate::access_ports::{DiagramDirectory, DirectoryRepository, GrantRepository, HierarchyStore};
use crate::audit::{AuditEvent, AuditRepository};

pub(crate) fn user_named(username: &str, roles: impl IntoIterator<Item = RoleId>) -> UserAccount {
    UserAccount {
        id: UserId::new(),
        username: username.to_owned(),
        display_name: username.to_owned(),
        role_ids: roles.into_iter().collect(),
        enabled: true,
    }
}

pub(crate) fn role_named(name: &str) -> RoleDefinition {
    RoleDefinition {
        id: RoleId::new(),
        name: RoleName::new(name).unwrap_or_else(|_| unreachable!("test role names are non-empty")),
        display_name: name.to_owned(),
        description: None,
    }
}

pub(crate) fn group_named(name: &str, members: impl IntoIterator<Item = UserId>) -> GroupDefinition {
    GroupDefinition {
        id: GroupId::new(),
        name: name.to_owned(),
        description: None,
        active: true,
        member_user_ids: members.into_iter().collect(),
    }
}

pub(crate) fn diagram_named(id: &str, owner: &str) -> DiagramRef {
    DiagramRef {
        id: diagram_id(id),
        owner_username: owner.to_owned(),
    }
}

pub(crate) fn diagram_id(id: &str) -> DiagramId {
    DiagramId::new(id).unwrap_or_else(|_| unreachable!("test diagram ids are non-empty"))
}

pub(crate) fn active_grant(
    diagram: &DiagramId,
    principal: PrincipalRef,
    level: PermissionLevel,
) -> DiagramGrant {
    DiagramGrant {
        id: GrantId::new(),
        diagram_id: diagram.clone(),
        principal,
        permission_level: level,
        granted_by: "root".to_owned(),
        granted_at: Utc::now(),
        notes: None,
        active: true,
    }
}

/// In-memory directory fake.
#[derive(Default)]
pub(crate) struct MemoryDirectory {
    pub users: Mutex<HashMap<UserId, UserAccount>>,
    pub roles: Mutex<HashMap<RoleId, RoleDefinition>>,
    pub groups: Mutex<HashMap<GroupId, GroupDefinition>>,
}

impl MemoryDirectory {
    pub(crate) async fn insert_user(&self, user: UserAccount) {
        self.users.lock().await.insert(user.id, user);
    }

    pub(crate) async fn insert_role(&self, role: RoleDefinition) {
        self.roles.lock().await.insert(role.id, role);
    }

    pub(crate) async fn insert_group(&self, group: GroupDefinition) {
        self.groups.lock().await.insert(group.id, group);
    }
}

#[async_trait]
impl DirectoryRepository for MemoryDirectory {
    async fn find_user_by_id(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        Ok(self.roles.lock().await.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .find(|role| role.name == *name)
            .cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.roles.lock().await.values().cloned().collect())
    }

    async fn find_group_by_id(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>> {
        Ok(self.groups.lock().await.get(&group_id).cloned())
    }

    async fn list_groups(&self) -> AppResult<Vec<GroupDefinition>> {
        Ok(self.groups.lock().await.values().cloned().collect())
    }

    async fn groups_of_user(&self, user_id: UserId) -> AppResult<Vec<GroupDefinition>> {
        Ok(self
            .groups
            .lock()
            .await
            .values()
            .filter(|group| group.active && group.has_member(user_id))
            .cloned()
            .collect())
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<()> {
        self.roles.lock().await.insert(role.id, role);
        Ok(())
    }

    async fn rename_role(
        &self,
        role_id: RoleId,
        name: RoleName,
        display_name: String,
    ) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let role = roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;
        role.name = name;
        role.display_name = display_name;
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.roles.lock().await.remove(&role_id);
        Ok(())
    }

    async fn create_group(&self, group: GroupDefinition) -> AppResult<()> {
        self.groups.lock().await.insert(group.id, group);
        Ok(())
    }

    async fn deactivate_group(&self, group_id: GroupId) -> AppResult<()> {
        let mut groups = self.groups.lock().await;
        let group = groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}'")))?;
        group.active = false;
        group.member_user_ids = BTreeSet::new();
        Ok(())
    }

    async fn add_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        let mut groups = self.groups.lock().await;
        let group = groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}'")))?;
        group.member_user_ids.insert(user_id);
        Ok(())
    }

    async fn remove_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        let mut groups = self.groups.lock().await;
        let group = groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}'")))?;
        group.member_user_ids.remove(&user_id);
        Ok(())
    }
}

/// In-memory hierarchy store fake; mutations run under one lock.
#[derive(Default)]
pub(crate) struct MemoryHierarchy {
    pub graph: Mutex<RoleHierarchyGraph>,
}

#[async_trait]
impl HierarchyStore for MemoryHierarchy {
    async fn load(&self) -> AppResult<RoleHierarchyGraph> {
        Ok(self.graph.lock().await.clone())
    }

    async fn insert_edge(&self, parent: RoleId, child: RoleId, level: i32) -> AppResult<()> {
        self.graph.lock().await.insert_edge(parent, child, level)
    }

    async fn remove_edge(&self, parent: RoleId, child: RoleId) -> AppResult<()> {
        self.graph.lock().await.remove_edge(parent, child);
        Ok(())
    }

    async fn references_role(&self, role: RoleId) -> AppResult<bool> {
        Ok(self.graph.lock().await.references_role(role))
    }
}

/// In-memory grant store fake.
#[derive(Default)]
pub(crate) struct MemoryGrants {
    pub grants: Mutex<Vec<DiagramGrant>>,
}

impl MemoryGrants {
    pub(crate) async fn insert(&self, grant: DiagramGrant) {
        self.grants.lock().await.push(grant);
    }
}

#[async_trait]
impl GrantRepository for MemoryGrants {
    async fn list_active_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.active && grant.diagram_id == *diagram_id)
            .cloned()
            .collect())
    }

    async fn list_for_diagram(&self, diagram_id: &DiagramId) -> AppResult<Vec<DiagramGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.diagram_id == *diagram_id)
            .cloned()
            .collect())
    }

    async fn find(&self, grant_id: GrantId) -> AppResult<Option<DiagramGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .find(|grant| grant.id == grant_id)
            .cloned())
    }

    async fn create(&self, grant: DiagramGrant) -> AppResult<()> {
        self.grants.lock().await.push(grant);
        Ok(())
    }

    async fn update_permission(&self, grant_id: GrantId, level: PermissionLevel) -> AppResult<()> {
        let mut grants = self.grants.lock().await;
        let grant = grants
            .iter_mut()
            .find(|grant| grant.id == grant_id)
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}'")))?;
        grant.permission_level = level;
        Ok(())
    }

    async fn deactivate(&self, grant_id: GrantId) -> AppResult<()> {
        let mut grants = self.grants.lock().await;
        let grant = grants
            .iter_mut()
            .find(|grant| grant.id == grant_id)
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}'")))?;
        grant.active = false;
        Ok(())
    }

    async fn references_principal(&self, principal: PrincipalRef) -> AppResult<bool> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .any(|grant| grant.principal == principal))
    }

    async fn deactivate_for_principal(&self, principal: PrincipalRef) -> AppResult<u64> {
        let mut grants = self.grants.lock().await;
        let mut count = 0;
        for grant in grants.iter_mut() {
            if grant.active && grant.principal == principal {
                grant.active = false;
                count += 1;
            }
        }
        Ok(count)
    }
}

/// In-memory diagram directory fake.
#[derive(Default)]
pub(crate) struct MemoryDiagrams {
    pub diagrams: Mutex<HashMap<DiagramId, DiagramRef>>,
}

impl MemoryDiagrams {
    pub(crate) async fn insert(&self, diagram: DiagramRef) {
        self.diagrams.lock().await.insert(diagram.id.clone(), diagram);
    }
}

#[async_trait]
impl DiagramDirectory for MemoryDiagrams {
    async fn find_diagram(&self, diagram_id: &DiagramId) -> AppResult<Option<DiagramRef>> {
        Ok(self.diagrams.lock().await.get(diagram_id).cloned())
    }
}

/// Audit sink capturing appended events.
#[derive(Default)]
pub(crate) struct MemoryAudit {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for MemoryAudit {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
