use async_trait::async_trait;
use diagrid_application::DiagramDirectory;
use diagrid_core::AppResult;
use diagrid_domain::{DiagramId, DiagramRef};

use crate::persistence_client::PersistenceClient;

/// Diagram catalog backed by the Persistence API.
#[derive(Debug, Clone)]
pub struct HttpDiagramDirectory {
    client: PersistenceClient,
}

impl HttpDiagramDirectory {
    /// Creates a diagram directory over the shared client.
    #[must_use]
    pub fn new(client: PersistenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DiagramDirectory for HttpDiagramDirectory {
    async fn find_diagram(&self, diagram_id: &DiagramId) -> AppResult<Option<DiagramRef>> {
        self.client
            .get_optional(&format!("diagrams/{diagram_id}"))
            .await
    }
}
