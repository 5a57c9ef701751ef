//! Shared primitives for all Rust crates in Diagrid.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Diagrid crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
///
/// The access-control taxonomy (`HierarchyCycle`, `InvalidEdge`,
/// `PrincipalNotFound`, `RoleInUse`) is surfaced synchronously to
/// administration callers with enough detail to correct the request.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Inserting a role hierarchy edge would create a cycle.
    ///
    /// `path` lists role names from the proposed child back to the proposed
    /// parent along existing edges, so the caller can see the loop it would
    /// have closed.
    #[error("hierarchy cycle rejected: {}", path.join(" -> "))]
    HierarchyCycle {
        /// Role names along the existing path that would close the cycle.
        path: Vec<String>,
    },

    /// A hierarchy edge is structurally invalid (for example a self-edge).
    #[error("invalid hierarchy edge: {0}")]
    InvalidEdge(String),

    /// A grant or membership edit referenced a missing or inactive principal.
    #[error("principal not found: {0}")]
    PrincipalNotFound(String),

    /// A role cannot be deleted while hierarchy edges or grants reference it.
    #[error("role in use: {0}")]
    RoleInUse(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
