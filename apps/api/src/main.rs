//! Diagrid access-control API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use diagrid_application::{
    AccessAdminService, AccessGuard, AccessService, DiagramDirectory, GrantRepository, GuardConfig,
};
use diagrid_core::AppError;
use diagrid_infrastructure::{
    HttpDiagramDirectory, HttpGrantRepository, InMemoryAuditLogRepository,
    InMemoryDiagramDirectory, InMemoryDirectoryRepository, InMemoryGrantRepository,
    InMemoryHierarchyStore, PersistenceClient,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration as CookieDuration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let guard_timeout_ms = env::var("GUARD_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(2_000);
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");
    let persistence_url = env::var("PERSISTENCE_URL")
        .ok()
        .filter(|value| !value.trim().is_empty());
    let dev_seed_enabled = env::var("DEV_SEED")
        .unwrap_or_else(|_| "true".to_owned())
        .eq_ignore_ascii_case("true");

    let directory = Arc::new(InMemoryDirectoryRepository::new());
    let hierarchy = Arc::new(InMemoryHierarchyStore::new());
    let audit = Arc::new(InMemoryAuditLogRepository::new());

    let (grants, diagrams): (Arc<dyn GrantRepository>, Arc<dyn DiagramDirectory>) =
        match &persistence_url {
            Some(raw) => {
                let base_url = Url::parse(raw).map_err(|error| {
                    AppError::Validation(format!("invalid PERSISTENCE_URL: {error}"))
                })?;
                let client = PersistenceClient::new(reqwest::Client::new(), base_url);
                info!(persistence_url = raw.as_str(), "using remote persistence for diagrams and grants");
                (
                    Arc::new(HttpGrantRepository::new(client.clone())),
                    Arc::new(HttpDiagramDirectory::new(client)),
                )
            }
            None => {
                let diagram_directory = Arc::new(InMemoryDiagramDirectory::new());
                if dev_seed_enabled {
                    dev_seed::seed_diagrams(diagram_directory.as_ref()).await?;
                }
                (
                    Arc::new(InMemoryGrantRepository::new()),
                    diagram_directory,
                )
            }
        };

    if dev_seed_enabled {
        dev_seed::seed_directory(directory.as_ref(), hierarchy.as_ref()).await?;
    }

    let access_service = Arc::new(AccessService::new(
        directory.clone(),
        hierarchy.clone(),
        grants.clone(),
        diagrams.clone(),
    ));
    let admin_service = Arc::new(AccessAdminService::new(
        directory.clone(),
        hierarchy.clone(),
        grants.clone(),
        audit.clone(),
    ));
    let guard = Arc::new(AccessGuard::new(
        access_service.clone(),
        GuardConfig {
            resource_check_timeout: Duration::from_millis(guard_timeout_ms),
        },
    ));

    let app_state = AppState {
        access_service,
        admin_service,
        guard,
        directory,
        frontend_url: frontend_url.clone(),
    };

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(CookieDuration::hours(8)));

    let router = build_router(app_state, &frontend_url, session_layer)?;

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Validation(format!("invalid API_HOST: {error}")))?;
    let address = SocketAddr::new(host, api_port);
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "diagrid access api listening");
    axum::serve(listener, router)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}

fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<MemoryStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route(
            "/api/diagrams/{diagram_id}/access",
            get(handlers::access::diagram_access_handler),
        )
        .route(
            "/api/diagrams/{diagram_id}/grants",
            get(handlers::access::list_grants_handler)
                .post(handlers::access::create_grant_handler),
        )
        .route(
            "/api/diagrams/{diagram_id}/grants/{grant_id}",
            delete(handlers::access::deactivate_grant_handler),
        )
        .route(
            "/api/diagrams/{diagram_id}/grants/{grant_id}/permission",
            put(handlers::access::update_grant_permission_handler),
        )
        .route(
            "/api/admin/roles",
            get(handlers::admin::list_roles_handler).post(handlers::admin::create_role_handler),
        )
        .route("/api/admin/roles/tree", get(handlers::admin::role_tree_handler))
        .route(
            "/api/admin/roles/{role_id}",
            put(handlers::admin::rename_role_handler).delete(handlers::admin::delete_role_handler),
        )
        .route(
            "/api/admin/hierarchy/edges",
            post(handlers::admin::create_hierarchy_edge_handler),
        )
        .route(
            "/api/admin/hierarchy/edges/{parent_id}/{child_id}",
            delete(handlers::admin::delete_hierarchy_edge_handler),
        )
        .route(
            "/api/admin/groups",
            get(handlers::admin::list_groups_handler).post(handlers::admin::create_group_handler),
        )
        .route(
            "/api/admin/groups/{group_id}",
            delete(handlers::admin::delete_group_handler),
        )
        .route(
            "/api/admin/groups/{group_id}/members/{user_id}",
            put(handlers::admin::add_group_member_handler)
                .delete(handlers::admin::remove_group_member_handler),
        )
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let auth_routes = Router::new()
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler));

    let cors_origin = frontend_url
        .parse::<HeaderValue>()
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
