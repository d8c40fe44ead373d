//! Domain service for account registration and login.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("User does not exist")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Input for registration. `phone_number` is the only optional field.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone_number: Option<String>,
}

/// Identity projection of a stored user. The password hash is filtered
/// out before anything leaves the service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub created_at: String,
}

/// Minimal identity returned on login. No token or session is issued.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub email: String,
    pub username: String,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates a user after the duplicate check, hashing the password.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] when the username or email is
    /// already taken.
    async fn register(&self, account: NewAccount) -> Result<RegisteredUser, AccountError>;

    /// Verifies credentials by email and returns the identity fields.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`] for an unknown email and
    /// [`AccountError::InvalidCredentials`] for a bad password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AccountError>;
}
