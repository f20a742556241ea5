//! Registration and login.

use std::sync::Arc;

use chrono::Utc;
use spendflow_shared::JwtService;
use spendflow_shared::auth::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use spendflow_shared::jwt::JwtError;
use spendflow_shared::types::UserId;
use thiserror::Error;
use tracing::info;

use super::password::{PasswordError, hash_password, verify_password};
use super::user::{User, UserStore, UserStoreError};
use super::{Role, RoleParseError};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 6;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed registration input.
    #[error("{0}")]
    Validation(String),

    /// Requested role does not exist.
    #[error(transparent)]
    UnknownRole(#[from] RoleParseError),

    /// Username already registered.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// Unknown user or wrong password. Deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Hashing failure.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token issuance failure.
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Storage failure.
    #[error("user store error: {0}")]
    Store(String),
}

impl AuthError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::UnknownRole(_) => 400,
            Self::InvalidCredentials => 401,
            Self::UsernameTaken(_) => 409,
            Self::Password(_) | Self::Token(_) | Self::Store(_) => 500,
        }
    }

    /// Stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::UnknownRole(_) => "VALIDATION_ERROR",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UsernameTaken(_) => "CONFLICT",
            Self::Password(_) | Self::Token(_) | Self::Store(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<UserStoreError> for AuthError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Duplicate(name) => Self::UsernameTaken(name),
            UserStoreError::Database(msg) => Self::Store(msg),
        }
    }
}

/// Registers users and issues access tokens.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl AuthService {
    /// Creates the service.
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Token service used for issuing and validating tokens.
    pub const fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Registers a user and returns a token for them.
    ///
    /// Any role may be requested at registration.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let username = request.username.trim().to_string();
        let len = username.chars().count();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
            return Err(AuthError::Validation(format!(
                "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
            )));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let role = Role::parse(&request.role)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken(username));
        }

        let user = self
            .users
            .create(User {
                id: UserId::new(),
                username,
                password_hash: hash_password(&request.password)?,
                role,
                created_at: Utc::now(),
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        self.issue(&user)
    }

    /// Verifies credentials and returns a token.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let Some(user) = self.users.find_by_username(request.username.trim()).await? else {
            info!(username = %request.username, "Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&request.password, &user.password_hash)? {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        self.issue(&user)
    }

    fn issue(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token =
            self.jwt
                .generate_access_token(user.id.into_inner(), &user.username, user.role.as_str())?;

        Ok(AuthResponse {
            token,
            expires_in: self.jwt.access_token_expires_in(),
            user: UserInfo {
                id: user.id.into_inner(),
                username: user.username.clone(),
                role: user.role.as_str().to_string(),
            },
        })
    }
}
