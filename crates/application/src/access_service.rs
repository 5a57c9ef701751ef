use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use diagrid_core::{AppError, AppResult, UserIdentity};
use diagrid_domain::{
    AccessInfo, DiagramId, RoleCatalog, RoleId, RoleName, UserAccount, UserId, resolve_access,
};
use tokio::sync::Mutex;

use crate::access_ports::{DiagramDirectory, DirectoryRepository, GrantRepository, HierarchyStore};
use crate::guard::CallerContext;


/// Closure results cached per hierarchy graph version.
///
/// Discarded wholesale whenever the graph version moves, so an edge mutation
/// can never leak stale inheritance into a later resolution.
#[derive(Debug, Default)]
struct ClosureCache {
    version: u64,
    by_role: HashMap<RoleId, BTreeSet<RoleId>>,
}

/// The permission resolution engine.
///
/// Assembles a snapshot of directory, hierarchy, membership, and grant state
/// through the ports and delegates the actual combination to the pure
/// [`resolve_access`] function. Performs no writes.
pub struct AccessService {
    directory: Arc<dyn DirectoryRepository>,
    hierarchy: Arc<dyn HierarchyStore>,
    grants: Arc<dyn GrantRepository>,
    diagrams: Arc<dyn DiagramDirectory>,
    closure_cache: Mutex<ClosureCache>,
}

impl AccessService {
    /// Creates the engine from port implementations.
    #[must_use]
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        hierarchy: Arc<dyn HierarchyStore>,
        grants: Arc<dyn GrantRepository>,
        diagrams: Arc<dyn DiagramDirectory>,
    ) -> Self {
        Self {
            directory,
            hierarchy,
            grants,
            diagrams,
            closure_cache: Mutex::new(ClosureCache::default()),
        }
    }

    /// Resolves the effective access of a user to a diagram.
    ///
    /// Unknown or disabled users resolve fail-closed to the NONE tier; an
    /// unknown diagram is a [`AppError::NotFound`] error.
    pub async fn resolve(&self, user_id: UserId, diagram_id: &DiagramId) -> AppResult<AccessInfo> {
        let Some(user) = self.directory.find_user_by_id(user_id).await? else {
            return Ok(AccessInfo::none());
        };

        self.resolve_for_account(&user, diagram_id).await
    }

    /// Resolves effective access for a user addressed by username.
    pub async fn resolve_for_username(
        &self,
        username: &str,
        diagram_id: &DiagramId,
    ) -> AppResult<AccessInfo> {
        let Some(user) = self.directory.find_user_by_username(username).await? else {
            return Ok(AccessInfo::none());
        };

        self.resolve_for_account(&user, diagram_id).await
    }

    async fn resolve_for_account(
        &self,
        user: &UserAccount,
        diagram_id: &DiagramId,
    ) -> AppResult<AccessInfo> {
        if !user.enabled {
            return Ok(AccessInfo::none());
        }

        let diagram = self
            .diagrams
            .find_diagram(diagram_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("diagram '{diagram_id}' does not exist")))?;

        let graph = self.hierarchy.load().await?;
        let roles = self.role_catalog().await?;
        let member_groups = self
            .directory
            .groups_of_user(user.id)
            .await?
            .into_iter()
            .filter(|group| group.active)
            .map(|group| group.id)
            .collect();
        let grants = self.grants.list_active_for_diagram(diagram_id).await?;

        Ok(resolve_access(
            user,
            &diagram,
            &graph,
            &roles,
            &member_groups,
            &grants,
        ))
    }

    /// Returns the names of all roles the user holds, directly or through the
    /// hierarchy closure.
    pub async fn effective_role_names(&self, user: &UserAccount) -> AppResult<BTreeSet<RoleName>> {
        let graph = self.hierarchy.load().await?;
        let roles = self.role_catalog().await?;

        let mut effective = BTreeSet::new();
        let mut cache = self.closure_cache.lock().await;
        if cache.version != graph.version() {
            cache.by_role.clear();
            cache.version = graph.version();
        }

        for role_id in &user.role_ids {
            let closure = cache
                .by_role
                .entry(*role_id)
                .or_insert_with(|| graph.closure(*role_id));
            effective.extend(
                closure
                    .iter()
                    .filter_map(|member| roles.get(member).cloned()),
            );
        }

        Ok(effective)
    }

    /// Builds the explicit caller snapshot consumed by the enforcement guard.
    ///
    /// A session whose user has vanished from the directory or been disabled
    /// yields a snapshot with no roles, so every guarded check fails closed.
    pub async fn caller_context(&self, identity: &UserIdentity) -> AppResult<CallerContext> {
        let user = self
            .directory
            .find_user_by_id(UserId::from_uuid(identity.user_id()))
            .await?
            .filter(|user| user.enabled);

        let effective_roles = match &user {
            Some(user) => self.effective_role_names(user).await?,
            None => BTreeSet::new(),
        };

        Ok(CallerContext {
            identity: identity.clone(),
            effective_roles,
        })
    }

    async fn role_catalog(&self) -> AppResult<RoleCatalog> {
        Ok(self
            .directory
            .list_roles()
            .await?
            .into_iter()
            .map(|role| (role.id, role.name))
            .collect())
    }
}
