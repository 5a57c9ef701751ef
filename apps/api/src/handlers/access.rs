//! Diagram access resolution and sharing (grant) endpoints.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use diagrid_application::{CreateGrantInput, GuardTarget};
use diagrid_core::{AppError, UserIdentity};
use diagrid_domain::{DiagramId, GrantId, PermissionLevel, UserId};

use crate::dto::{
    AccessInfoResponse, CreateGrantRequest, GrantResponse, UpdateGrantPermissionRequest,
};
use crate::error::ApiResult;
use crate::handlers::ensure_allowed;
use crate::state::AppState;

/// Resolves the caller's effective access to a diagram.
///
/// Always answers for an existing diagram; the NONE tier is a normal
/// response, not an error.
pub async fn diagram_access_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(diagram_id): Path<String>,
) -> ApiResult<Json<AccessInfoResponse>> {
    let diagram_id = DiagramId::new(diagram_id)?;
    let info = state
        .access_service
        .resolve(UserId::from_uuid(identity.user_id()), &diagram_id)
        .await?;

    Ok(Json(info.into()))
}

/// Lists a diagram's grants, inactive rows included, for the sharing dialog.
pub async fn list_grants_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(diagram_id): Path<String>,
) -> ApiResult<Json<Vec<GrantResponse>>> {
    let diagram_id = DiagramId::new(diagram_id)?;
    ensure_allowed(
        &state,
        &identity,
        GuardTarget::new(format!("/diagrams/{diagram_id}/grants"))
            .with_resource(diagram_id.clone(), PermissionLevel::Admin),
    )
    .await?;

    let grants = state.admin_service.list_grants_for_diagram(&diagram_id).await?;
    Ok(Json(grants.into_iter().map(GrantResponse::from).collect()))
}

pub async fn create_grant_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(diagram_id): Path<String>,
    Json(request): Json<CreateGrantRequest>,
) -> ApiResult<(StatusCode, Json<GrantResponse>)> {
    let diagram_id = DiagramId::new(diagram_id)?;
    ensure_allowed(
        &state,
        &identity,
        GuardTarget::new(format!("/diagrams/{diagram_id}/grants"))
            .with_resource(diagram_id.clone(), PermissionLevel::Admin),
    )
    .await?;

    let grant = state
        .admin_service
        .create_grant(
            &identity,
            CreateGrantInput {
                diagram_id,
                principal: request.principal,
                permission_level: request.permission_level,
                notes: request.notes,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(grant.into())))
}

pub async fn update_grant_permission_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((diagram_id, grant_id)): Path<(String, GrantId)>,
    Json(request): Json<UpdateGrantPermissionRequest>,
) -> ApiResult<StatusCode> {
    let diagram_id = DiagramId::new(diagram_id)?;
    ensure_allowed(
        &state,
        &identity,
        GuardTarget::new(format!("/diagrams/{diagram_id}/grants/{grant_id}"))
            .with_resource(diagram_id.clone(), PermissionLevel::Admin),
    )
    .await?;

    require_grant_on_diagram(&state, &diagram_id, grant_id).await?;
    state
        .admin_service
        .update_grant_permission(&identity, grant_id, request.permission_level)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_grant_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((diagram_id, grant_id)): Path<(String, GrantId)>,
) -> ApiResult<StatusCode> {
    let diagram_id = DiagramId::new(diagram_id)?;
    ensure_allowed(
        &state,
        &identity,
        GuardTarget::new(format!("/diagrams/{diagram_id}/grants/{grant_id}"))
            .with_resource(diagram_id.clone(), PermissionLevel::Admin),
    )
    .await?;

    require_grant_on_diagram(&state, &diagram_id, grant_id).await?;
    state
        .admin_service
        .deactivate_grant(&identity, grant_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Rejects grant ids that do not belong to the diagram in the path, so the
/// diagram-level authorization cannot be bypassed.
async fn require_grant_on_diagram(
    state: &AppState,
    diagram_id: &DiagramId,
    grant_id: GrantId,
) -> ApiResult<()> {
    let grants = state.admin_service.list_grants_for_diagram(diagram_id).await?;
    if grants.iter().any(|grant| grant.id == grant_id) {
        return Ok(());
    }

    Err(AppError::NotFound(format!(
        "grant '{grant_id}' does not exist on diagram '{diagram_id}'"
    ))
    .into())
}
