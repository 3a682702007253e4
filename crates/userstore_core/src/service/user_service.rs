//! User use-case service.
//!
//! # Responsibility
//! - Provide stable lookup/insert entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::{RepoResult, UserRepository};

/// Use-case service wrapper for user store operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Fetches one user by stable ID.
    ///
    /// Returns repository-level not-found or transport errors unchanged.
    pub fn get_user(&self, id: UserId) -> RepoResult<User> {
        self.repo.get_by_id(id)
    }

    /// Persists an already constructed user record.
    pub fn insert_user(&self, user: &User) -> RepoResult<User> {
        self.repo.insert(user)
    }

    /// Builds and persists a user from raw field input.
    ///
    /// # Contract
    /// - Field rules are enforced before any statement is issued.
    /// - Returns the persisted record on success.
    pub fn create_user(
        &self,
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> RepoResult<User> {
        let user = User::new(id, first_name, last_name)?;
        self.repo.insert(&user)
    }
}
