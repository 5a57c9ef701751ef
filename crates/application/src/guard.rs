use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use diagrid_core::UserIdentity;
use diagrid_domain::{DiagramId, PermissionLevel, RoleName, SystemRole, UserId};
use tokio::time::timeout;

use crate::access_service::AccessService;


/// Outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The caller may proceed to the target.
    Allow,
    /// The caller is denied with a typed reason.
    Deny(DenyReason),
}

/// Fail-closed denial reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated session was presented. The original target is
    /// preserved so navigation can resume after re-authentication.
    AuthenticationRequired {
        /// Target to resume after login.
        resume_target: String,
    },
    /// The target's static role requirement is not met.
    RoleRequirementNotMet {
        /// Target that declared the requirement.
        target: String,
    },
    /// The diagram-level permission threshold is not met, or the resolution
    /// engine failed or timed out. Both deny identically.
    DiagramAccessDenied {
        /// Diagram the check was evaluated against.
        diagram_id: DiagramId,
    },
}

/// Static role requirement a target can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Requires the global administrator role.
    Admin,
    /// Requires the modeler role or the administrator role.
    ModelerOrAbove,
    /// Requires any of the built-in roles.
    ViewerOrAbove,
    /// Requires at least one of the named roles.
    AnyOf(Vec<RoleName>),
    /// Requires every one of the named roles.
    AllOf(Vec<RoleName>),
}

impl RoleRequirement {
    /// Evaluates the requirement against held plus inherited role names.
    #[must_use]
    pub fn is_met_by(&self, effective_roles: &BTreeSet<RoleName>) -> bool {
        let holds = |system_role: SystemRole| {
            effective_roles
                .iter()
                .any(|name| name.as_str() == system_role.name())
        };

        match self {
            Self::Admin => holds(SystemRole::Admin),
            Self::ModelerOrAbove => holds(SystemRole::Admin) || holds(SystemRole::Modeler),
            Self::ViewerOrAbove => {
                holds(SystemRole::Admin) || holds(SystemRole::Modeler) || holds(SystemRole::Viewer)
            }
            Self::AnyOf(names) => names.iter().any(|name| effective_roles.contains(name)),
            Self::AllOf(names) => names.iter().all(|name| effective_roles.contains(name)),
        }
    }
}

/// Diagram-level permission threshold a target can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequirement {
    /// Diagram the target is parameterized by.
    pub diagram_id: DiagramId,
    /// Minimum permission level required.
    pub minimum_level: PermissionLevel,
}

/// A protected navigation or action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardTarget {
    /// Route or action identifier, used for resume-after-login and logging.
    pub path: String,
    /// Optional static role requirement.
    pub role_requirement: Option<RoleRequirement>,
    /// Optional diagram permission threshold.
    pub resource: Option<ResourceRequirement>,
}

impl GuardTarget {
    /// A target with no declared requirements beyond authentication.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role_requirement: None,
            resource: None,
        }
    }

    /// Declares a static role requirement.
    #[must_use]
    pub fn with_role_requirement(mut self, requirement: RoleRequirement) -> Self {
        self.role_requirement = Some(requirement);
        self
    }

    /// Declares a diagram permission threshold.
    #[must_use]
    pub fn with_resource(mut self, diagram_id: DiagramId, minimum_level: PermissionLevel) -> Self {
        self.resource = Some(ResourceRequirement {
            diagram_id,
            minimum_level,
        });
        self
    }
}

/// Explicit caller snapshot passed into every evaluation.
///
/// The guard never consults ambient state; identity and the effective role
/// set travel with the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// Authenticated session identity.
    pub identity: UserIdentity,
    /// Role names held directly or inherited through the hierarchy.
    pub effective_roles: BTreeSet<RoleName>,
}

/// Guard configuration.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Bound on the single awaited resource check; expiry denies.
    pub resource_check_timeout: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            resource_check_timeout: Duration::from_secs(2),
        }
    }
}

/// Result of one sequenced guard evaluation.
///
/// `superseded` marks an evaluation that finished after a newer one was
/// issued; its decision must not be applied over the newer decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardEvaluation {
    /// Issue order of this evaluation.
    pub sequence: u64,
    /// The fail-closed decision.
    pub decision: Decision,
    /// True when a newer evaluation was issued before this one finished.
    pub superseded: bool,
}

/// The access enforcement guard.
///
/// A sequential, fail-closed state machine evaluated once per protected
/// navigation: authenticated, then the global-admin short-circuit, then the
/// static role requirement, then the single awaited diagram permission check
/// under a bounded timeout.
pub struct AccessGuard {
    access: Arc<AccessService>,
    config: GuardConfig,
    sequence: AtomicU64,
}

impl AccessGuard {
    /// Creates a guard over the resolution engine.
    #[must_use]
    pub fn new(access: Arc<AccessService>, config: GuardConfig) -> Self {
        Self {
            access,
            config,
            sequence: AtomicU64::new(0),
        }
    }

    /// Evaluates one protected navigation or action.
    ///
    /// `caller` is `None` for an unauthenticated request; that denial comes
    /// first, before any role or resource requirement is looked at. Only the
    /// resource check suspends.
    pub async fn evaluate(
        &self,
        target: &GuardTarget,
        caller: Option<&CallerContext>,
    ) -> GuardEvaluation {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let decision = self.decide(target, caller).await;
        let superseded = self.sequence.load(Ordering::SeqCst) != sequence;

        GuardEvaluation {
            sequence,
            decision,
            superseded,
        }
    }

    async fn decide(&self, target: &GuardTarget, caller: Option<&CallerContext>) -> Decision {
        let Some(caller) = caller else {
            return Decision::Deny(DenyReason::AuthenticationRequired {
                resume_target: target.path.clone(),
            });
        };

        // The override is defined here exactly once, not per call site.
        if RoleRequirement::Admin.is_met_by(&caller.effective_roles) {
            return Decision::Allow;
        }

        if let Some(requirement) = &target.role_requirement
            && !requirement.is_met_by(&caller.effective_roles)
        {
            return Decision::Deny(DenyReason::RoleRequirementNotMet {
                target: target.path.clone(),
            });
        }

        if let Some(resource) = &target.resource {
            let user_id = UserId::from_uuid(caller.identity.user_id());
            let check = self.access.resolve(user_id, &resource.diagram_id);

            let allowed = match timeout(self.config.resource_check_timeout, check).await {
                Ok(Ok(info)) => info.permission_level >= Some(resource.minimum_level),
                Ok(Err(error)) => {
                    tracing::warn!(
                        target_path = %target.path,
                        diagram_id = %resource.diagram_id,
                        %error,
                        "resolution engine failed; denying access"
                    );
                    false
                }
                Err(_) => {
                    tracing::warn!(
                        target_path = %target.path,
                        diagram_id = %resource.diagram_id,
                        timeout = ?self.config.resource_check_timeout,
                        "resource check timed out; denying access"
                    );
                    false
                }
            };

            if !allowed {
                return Decision::Deny(DenyReason::DiagramAccessDenied {
                    diagram_id: resource.diagram_id.clone(),
                });
            }
        }

        Decision::Allow
    }
}
