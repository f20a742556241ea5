//! User records and the storage seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use spendflow_shared::types::UserId;
use thiserror::Error;

use super::Role;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role.
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// User storage errors.
#[derive(Debug, Error)]
pub enum UserStoreError {
    /// The username is already taken.
    #[error("username '{0}' is already taken")]
    Duplicate(String),

    /// Backend failure.
    #[error("user store error: {0}")]
    Database(String),
}

/// Persistence for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Usernames are unique.
    async fn create(&self, user: User) -> Result<User, UserStoreError>;

    /// Looks a user up by login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;

    /// Looks a user up by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError>;
}
