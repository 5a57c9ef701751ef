use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use diagrid_application::{Decision, DenyReason, GuardTarget};
use diagrid_core::{AppError, UserIdentity};
use serde::Serialize;
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// 401 payload carrying the target the client should return to after login.
#[derive(Debug, Serialize)]
struct AuthenticationRequiredBody {
    message: String,
    resume_target: String,
}

/// Resolves the session identity for the request, or denies through the
/// guard so the requested target is preserved for resume-after-login.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    let Some(identity) = identity else {
        let requested = request.uri().path().to_owned();
        let evaluation = state
            .guard
            .evaluate(&GuardTarget::new(requested.clone()), None)
            .await;
        return Ok(authentication_required(evaluation.decision, requested));
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn authentication_required(decision: Decision, requested: String) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthenticationRequiredBody {
            message: "authentication required".to_owned(),
            resume_target: resume_target_of(decision, requested),
        }),
    )
        .into_response()
}

fn resume_target_of(decision: Decision, requested: String) -> String {
    match decision {
        Decision::Deny(DenyReason::AuthenticationRequired { resume_target }) => resume_target,
        Decision::Allow | Decision::Deny(_) => requested,
    }
}

/// Blocks state-changing requests from foreign origins; reads are left to
/// the CORS policy.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing(request.method()) && !same_origin(request.headers(), &state.frontend_url)
    {
        return Err(AppError::Unauthorized("request origin rejected".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn same_origin(headers: &HeaderMap, frontend_url: &str) -> bool {
    if headers
        .get("sec-fetch-site")
        .is_some_and(|site| site == "cross-site")
    {
        return false;
    }

    let origin = header_text(headers, header::ORIGIN);
    let referer = header_text(headers, header::REFERER);
    origin == frontend_url || referer.starts_with(frontend_url)
}

fn header_text<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
