use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use diagrid_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{LoginRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// Establishes a session for a directory user.
///
/// Credentials live with the external identity source; deployments put it in
/// front of this API, and the local login trusts the asserted username.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let user = state
        .directory
        .find_user_by_username(&request.username)
        .await?
        .filter(|user| user.enabled)
        .ok_or_else(|| AppError::Unauthorized("unknown or disabled user".to_owned()))?;

    let identity = UserIdentity::new(user.id.as_uuid(), user.username, user.display_name);
    session
        .insert(SESSION_USER_KEY, identity.clone())
        .await
        .map_err(|error| AppError::Internal(format!("failed to store session: {error}")))?;

    identity_response(&state, identity).await
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    identity_response(&state, identity).await
}

async fn identity_response(
    state: &AppState,
    identity: UserIdentity,
) -> ApiResult<Json<UserIdentityResponse>> {
    let caller = state.access_service.caller_context(&identity).await?;

    Ok(Json(UserIdentityResponse {
        user_id: identity.user_id(),
        username: identity.username().to_owned(),
        display_name: identity.display_name().to_owned(),
        roles: caller
            .effective_roles
            .iter()
            .map(|role| role.as_str().to_owned())
            .collect(),
    }))
}
