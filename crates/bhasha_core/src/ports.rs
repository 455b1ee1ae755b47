//! crates/bhasha_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete database behind it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewUser, Progress, User};

//=========================================================================================
// Error and Result Types
//=========================================================================================

/// The error taxonomy shared by every port operation.
///
/// Each variant corresponds to one class of user-visible failure; the API
/// boundary maps them onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input, caught before any storage access.
    #[error("{0}")]
    Validation(String),
    /// A uniqueness constraint was violated (duplicate username or email).
    #[error("{0}")]
    Conflict(String),
    /// Missing, invalid, or expired credential, or a failed password check.
    #[error("{0}")]
    Authentication(String),
    /// A referenced entity is absent where absence is an error.
    #[error("{0}")]
    NotFound(String),
    /// The underlying store failed or timed out.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Storage operations backing the identity service.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Persists a new user. A unique-index violation on username or email
    /// surfaces as [`CoreError::Conflict`], which closes the race left open
    /// by the caller's check-then-insert sequence.
    async fn create_user(&self, user: NewUser) -> CoreResult<User>;

    async fn find_user_by_username(&self, username: &str) -> CoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> CoreResult<Option<User>>;
}

/// Storage operations backing the progress store.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Point lookup for one (user, level file) pair. `None` means "no
    /// progress yet", which is a valid state rather than an error.
    async fn get_progress(&self, user_id: &str, level_file: &str)
        -> CoreResult<Option<Progress>>;

    /// Atomic create-or-overwrite keyed on (user, level file). Exactly one
    /// record exists per key after this call, however many times it runs.
    async fn upsert_progress(
        &self,
        user_id: &str,
        level_file: &str,
        last_lesson: i32,
    ) -> CoreResult<Progress>;
}
