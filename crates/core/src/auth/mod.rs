//! Users, roles and authentication.
//!
//! This module provides:
//! - Role definitions and the acting [`Identity`] of a request
//! - Password hashing with Argon2id
//! - The [`UserStore`] persistence seam and an in-memory implementation
//! - [`AuthService`] for registration and login

mod memory;
mod password;
mod service;
mod user;

pub use memory::InMemoryUserStore;
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{AuthError, AuthService};
pub use user::{User, UserStore, UserStoreError};

use serde::{Deserialize, Serialize};
use spendflow_shared::Claims;
use spendflow_shared::types::UserId;
use thiserror::Error;

/// User roles.
///
/// Every role except `Employee` can appear in an approval flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submits expenses.
    Employee,
    /// First-line approver.
    Manager,
    /// Finance review.
    Finance,
    /// Final sign-off.
    Director,
    /// Full access, sees every expense.
    Admin,
}

/// Error returned when a role name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct RoleParseError(pub String);

impl Role {
    /// All roles, in seniority order.
    pub const ALL: [Self; 5] = [
        Self::Employee,
        Self::Manager,
        Self::Finance,
        Self::Director,
        Self::Admin,
    ];

    /// Parses a role name, case-insensitively.
    pub fn parse(name: &str) -> Result<Self, RoleParseError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "finance" => Ok(Self::Finance),
            "director" => Ok(Self::Director),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleParseError(name.to_string())),
        }
    }

    /// Lower-case role name as stored and serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Finance => "finance",
            Self::Director => "director",
            Self::Admin => "admin",
        }
    }

    /// Returns true if this role may act on approvals.
    #[must_use]
    pub const fn can_approve(&self) -> bool {
        !matches!(self, Self::Employee)
    }

    /// Returns true if this role has administrative access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The authenticated user acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// User ID.
    pub user_id: UserId,
    /// Username.
    pub username: String,
    /// Role at the time the token was issued.
    pub role: Role,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    /// Builds an identity from validated token claims.
    pub fn from_claims(claims: &Claims) -> Result<Self, RoleParseError> {
        Ok(Self {
            user_id: UserId::from_uuid(claims.user_id()),
            username: claims.username.clone(),
            role: Role::parse(&claims.role)?,
        })
    }
}
