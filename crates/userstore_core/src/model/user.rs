//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record persisted in the `users` table.
//! - Centralize the validity rules shared by write paths.
//!
//! # Invariants
//! - `id` is positive and unique across all persisted users.
//! - `first_name` and `last_name` are non-empty after trimming.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a persisted user.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UserId = i64;

/// Canonical user record.
///
/// Identifiers are caller-supplied; the store only enforces their
/// uniqueness. Serialized field names follow the external wire shape
/// (`firstName`, `lastName`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Caller-chosen stable ID, unique in the backing store.
    pub id: UserId,
    /// Given name, non-empty.
    pub first_name: String,
    /// Family name, non-empty.
    pub last_name: String,
}

/// Validity violations for a [`User`] record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// `id` must be a positive integer.
    NonPositiveId(UserId),
    /// `first_name` is empty or whitespace-only.
    EmptyFirstName,
    /// `last_name` is empty or whitespace-only.
    EmptyLastName,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "user id must be positive, got {id}"),
            Self::EmptyFirstName => write!(f, "user first name cannot be empty"),
            Self::EmptyLastName => write!(f, "user last name cannot be empty"),
        }
    }
}

impl Error for UserValidationError {}

impl User {
    /// Creates a validated user record.
    ///
    /// # Errors
    /// - Returns the first violated rule when `id` is non-positive or a
    ///   name field is empty.
    pub fn new(
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let user = Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        };
        user.validate()?;
        Ok(user)
    }

    /// Checks record validity against the user invariants.
    ///
    /// Repository write paths call this before issuing any statement, so
    /// malformed records never reach the backend.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.id <= 0 {
            return Err(UserValidationError::NonPositiveId(self.id));
        }
        if self.first_name.trim().is_empty() {
            return Err(UserValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(UserValidationError::EmptyLastName);
        }
        Ok(())
    }
}
