use std::collections::HashMap;

use async_trait::async_trait;
use diagrid_application::DirectoryRepository;
use diagrid_core::{AppError, AppResult};
use diagrid_domain::{
    GroupDefinition, GroupId, RoleDefinition, RoleId, RoleName, UserAccount, UserId,
};
use tokio::sync::RwLock;

/// In-memory user, role, and group directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    users: RwLock<HashMap<UserId, UserAccount>>,
    roles: RwLock<HashMap<RoleId, RoleDefinition>>,
    groups: RwLock<HashMap<GroupId, GroupDefinition>>,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user account, replacing any existing row with the same id.
    pub async fn seed_user(&self, user: UserAccount) {
        self.users.write().await.insert(user.id, user);
    }

    /// Seeds a role definition, replacing any existing row with the same id.
    pub async fn seed_role(&self, role: RoleDefinition) {
        self.roles.write().await.insert(role.id, role);
    }

    /// Seeds a group definition, replacing any existing row with the same id.
    pub async fn seed_group(&self, group: GroupDefinition) {
        self.groups.write().await.insert(group.id, group);
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn find_user_by_id(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|role| role.name == *name)
            .cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let mut roles: Vec<RoleDefinition> = self.roles.read().await.values().cloned().collect();
        roles.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));
        Ok(roles)
    }

    async fn find_group_by_id(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>> {
        Ok(self.groups.read().await.get(&group_id).cloned())
    }

    async fn list_groups(&self) -> AppResult<Vec<GroupDefinition>> {
        let mut groups: Vec<GroupDefinition> =
            self.groups.read().await.values().cloned().collect();
        groups.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(groups)
    }

    async fn groups_of_user(&self, user_id: UserId) -> AppResult<Vec<GroupDefinition>> {
        Ok(self
            .groups
            .read()
            .await
            .values()
            .filter(|group| group.active && group.has_member(user_id))
            .cloned()
            .collect())
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(&role.id) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.id
            )));
        }
        roles.insert(role.id, role);
        Ok(())
    }

    async fn rename_role(
        &self,
        role_id: RoleId,
        name: RoleName,
        display_name: String,
    ) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        role.name = name;
        role.display_name = display_name;
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.roles
            .write()
            .await
            .remove(&role_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn create_group(&self, group: GroupDefinition) -> AppResult<()> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(&group.id) {
            return Err(AppError::Conflict(format!(
                "group '{}' already exists",
                group.id
            )));
        }
        groups.insert(group.id, group);
        Ok(())
    }

    async fn deactivate_group(&self, group_id: GroupId) -> AppResult<()> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))?;
        group.active = false;
        group.member_user_ids.clear();
        Ok(())
    }

    async fn add_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))?;
        group.member_user_ids.insert(user_id);
        Ok(())
    }

    async fn remove_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))?;
        group.member_user_ids.remove(&user_id);
        Ok(())
    }
}
