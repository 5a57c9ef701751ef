use std::sync::Arc;

use diagrid_application::{AccessAdminService, AccessGuard, AccessService, DirectoryRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: Arc<AccessService>,
    pub admin_service: Arc<AccessAdminService>,
    pub guard: Arc<AccessGuard>,
    pub directory: Arc<dyn DirectoryRepository>,
    pub frontend_url: String,
}
