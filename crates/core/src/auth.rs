use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User information persisted in the authenticated session.
///
/// Carries only identity facts; role and group snapshots are resolved per
/// request and passed explicitly to the services that need them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: Uuid,
    username: String,
    display_name: String,
}

impl UserIdentity {
    /// Creates a user identity from directory data.
    #[must_use]
    pub fn new(user_id: Uuid, username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the stable user id from the identity source.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns the unique username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
