use std::collections::HashMap;

use async_trait::async_trait;
use diagrid_application::DiagramDirectory;
use diagrid_core::AppResult;
use diagrid_domain::{DiagramId, DiagramRef};
use tokio::sync::RwLock;

/// In-memory diagram catalog.
#[derive(Debug, Default)]
pub struct InMemoryDiagramDirectory {
    diagrams: RwLock<HashMap<DiagramId, DiagramRef>>,
}

impl InMemoryDiagramDirectory {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a diagram reference.
    pub async fn seed_diagram(&self, diagram: DiagramRef) {
        self.diagrams
            .write()
            .await
            .insert(diagram.id.clone(), diagram);
    }
}

#[async_trait]
impl DiagramDirectory for InMemoryDiagramDirectory {
    async fn find_diagram(&self, diagram_id: &DiagramId) -> AppResult<Option<DiagramRef>> {
        Ok(self.diagrams.read().await.get(diagram_id).cloned())
    }
}
