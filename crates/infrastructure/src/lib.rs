//! Infrastructure adapters for application ports.
//!
//! In-memory adapters back tests and local development; the HTTP adapters
//! talk to the remote Persistence API that owns diagram metadata and grants.

#![forbid(unsafe_code)]

mod http_diagram_directory;
mod http_grant_repository;
mod in_memory_audit_log_repository;
mod in_memory_diagram_directory;
mod in_memory_directory_repository;
mod in_memory_grant_repository;
mod in_memory_hierarchy_store;
mod persistence_client;

pub use http_diagram_directory::HttpDiagramDirectory;
pub use http_grant_repository::HttpGrantRepository;
pub use in_memory_audit_log_repository::InMemoryAuditLogRepository;
pub use in_memory_diagram_directory::InMemoryDiagramDirectory;
pub use in_memory_directory_repository::InMemoryDirectoryRepository;
pub use in_memory_grant_repository::InMemoryGrantRepository;
pub use in_memory_hierarchy_store::InMemoryHierarchyStore;
pub use persistence_client::PersistenceClient;
