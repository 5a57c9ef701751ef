pub mod access;
pub mod admin;

use diagrid_application::{Decision, DenyReason, GuardTarget};
use diagrid_core::{AppError, UserIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

/// Runs the enforcement guard for one request and maps denials to API errors.
pub(crate) async fn ensure_allowed(
    state: &AppState,
    identity: &UserIdentity,
    target: GuardTarget,
) -> ApiResult<()> {
    let caller = state.access_service.caller_context(identity).await?;
    let evaluation = state.guard.evaluate(&target, Some(&caller)).await;

    match evaluation.decision {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::AuthenticationRequired { .. }) => {
            Err(AppError::Unauthorized("authentication required".to_owned()).into())
        }
        Decision::Deny(DenyReason::RoleRequirementNotMet { target }) => {
            Err(AppError::Forbidden(format!("missing required role for {target}")).into())
        }
        Decision::Deny(DenyReason::DiagramAccessDenied { diagram_id }) => Err(AppError::Forbidden(
            format!("insufficient permission on diagram '{diagram_id}'"),
        )
        .into()),
    }
}
