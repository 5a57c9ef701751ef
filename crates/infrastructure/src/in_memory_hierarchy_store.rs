use async_trait::async_trait;
use diagrid_application::HierarchyStore;
use diagrid_core::AppResult;
use diagrid_domain::{RoleHierarchyGraph, RoleId};
use tokio::sync::Mutex;

/// In-memory role hierarchy store.
///
/// One lock serializes mutations, so the cycle check and the insert that
/// depends on it are a single atomic step.
#[derive(Debug, Default)]
pub struct InMemoryHierarchyStore {
    graph: Mutex<RoleHierarchyGraph>,
}

impl InMemoryHierarchyStore {
    /// Creates an empty hierarchy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
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

#[cfg(test)]
mod tests {
    use diagrid_core::AppError;

    use super::*;

    #[tokio::test]
    async fn rejected_insert_leaves_the_stored_graph_unchanged() {
        let store = InMemoryHierarchyStore::new();
        let a = RoleId::new();
        let b = RoleId::new();

        assert!(store.insert_edge(a, b, 1).await.is_ok());
        let rejected = store.insert_edge(b, a, 1).await;
        assert!(matches!(rejected, Err(AppError::HierarchyCycle { .. })));

        let graph = store.load().await.unwrap_or_default();
        assert!(graph.contains_edge(a, b));
        assert!(!graph.contains_edge(b, a));
    }

    #[tokio::test]
    async fn loaded_snapshot_does_not_track_later_mutations() {
        let store = InMemoryHierarchyStore::new();
        let a = RoleId::new();
        let b = RoleId::new();

        let snapshot = store.load().await.unwrap_or_default();
        assert!(store.insert_edge(a, b, 1).await.is_ok());

        assert!(!snapshot.contains_edge(a, b));
        assert!(snapshot.version() < store.load().await.unwrap_or_default().version());
    }
}
