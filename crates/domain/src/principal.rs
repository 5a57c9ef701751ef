use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use diagrid_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user record.
    UserId
);
uuid_id!(
    /// Unique identifier for a role record.
    RoleId
);
uuid_id!(
    /// Unique identifier for a group record.
    GroupId
);
uuid_id!(
    /// Unique identifier for a diagram grant.
    GrantId
);

/// Opaque identifier of a diagram owned by the external editor surface.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagramId(NonEmptyString);

impl DiagramId {
    /// Creates a validated diagram identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)
            .map_err(|_| AppError::Validation("diagram id must not be empty".to_owned()))?;

        Ok(Self(value))
    }

    /// Returns the underlying identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for DiagramId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.as_str())
    }
}

/// Unique role name, such as the distinguished `ADMIN` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a validated role name, trimmed of surrounding whitespace.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let name = NonEmptyString::new(value.trim())
            .map_err(|_| AppError::Validation("role name must not be empty".to_owned()))?;

        Ok(Self(name))
    }

    /// Returns the role name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.as_str())
    }
}

/// User record read from the external identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Stable user identifier.
    pub id: UserId,
    /// Unique username.
    pub username: String,
    /// Display name shown in sharing dialogs.
    pub display_name: String,
    /// Roles held directly, before hierarchy expansion.
    pub role_ids: BTreeSet<RoleId>,
    /// Disabled users resolve to no access.
    pub enabled: bool,
}

/// Role record with identity stable once referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: RoleName,
    /// Human-readable display name.
    pub display_name: String,
    /// Free-form description.
    pub description: Option<String>,
}

/// Group of users that grants can target collectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Stable group identifier.
    pub id: GroupId,
    /// Unique group name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Inactive groups are excluded from resolution.
    pub active: bool,
    /// Current member user ids.
    pub member_user_ids: BTreeSet<UserId>,
}

impl GroupDefinition {
    /// Returns whether the user currently belongs to this group.
    #[must_use]
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.member_user_ids.contains(&user_id)
    }
}

/// Diagram reference owned by the external editor surface.
///
/// Access control reads only the id and the ownership field; the owner is an
/// implicit admin-level principal without a stored grant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRef {
    /// Opaque diagram identifier.
    pub id: DiagramId,
    /// Username of the diagram's owner.
    pub owner_username: String,
}
