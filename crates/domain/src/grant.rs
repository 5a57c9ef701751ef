use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::{DiagramId, GrantId, GroupId, RoleId, UserId};
use crate::security::{PermissionLevel, PrincipalType};

/// Typed reference to a grant's principal.
///
/// Closed over the three principal kinds; the wire form pairs the
/// `USER|GROUP|ROLE` code with the principal's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "UPPERCASE")]
pub enum PrincipalRef {
    /// Grant directly to one user.
    User(UserId),
    /// Grant to every member of a group.
    Group(GroupId),
    /// Grant to every holder of a role, including hierarchy inheritors.
    Role(RoleId),
}

impl PrincipalRef {
    /// Returns the principal kind of this reference.
    #[must_use]
    pub fn principal_type(&self) -> PrincipalType {
        match self {
            Self::User(_) => PrincipalType::User,
            Self::Group(_) => PrincipalType::Group,
            Self::Role(_) => PrincipalType::Role,
        }
    }

    /// Returns the principal's raw UUID value.
    #[must_use]
    pub fn principal_uuid(&self) -> Uuid {
        match self {
            Self::User(id) => id.as_uuid(),
            Self::Group(id) => id.as_uuid(),
            Self::Role(id) => id.as_uuid(),
        }
    }
}

impl std::fmt::Display for PrincipalRef {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}:{}",
            self.principal_type().as_str(),
            self.principal_uuid()
        )
    }
}

/// Stored access grant for one diagram.
///
/// Duplicate grants to the same principal are legal; the max-rule at
/// resolution time makes them harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramGrant {
    /// Stable grant identifier.
    pub id: GrantId,
    /// Diagram the grant applies to.
    pub diagram_id: DiagramId,
    /// Principal the grant targets.
    pub principal: PrincipalRef,
    /// Permission tier conferred.
    pub permission_level: PermissionLevel,
    /// Username of the administrator who created the grant.
    pub granted_by: String,
    /// Creation timestamp.
    pub granted_at: DateTime<Utc>,
    /// Free-form notes captured during grant.
    pub notes: Option<String>,
    /// Inactive grants are kept for audit but excluded from resolution.
    pub active: bool,
}
