//! Domain service for user accounts and API key checks.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// New account request, already shape-checked by the caller.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Option<String>,
}

/// Account summary returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub id: i32,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub api_key: String,
    pub created_at: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and returns its API key.
    ///
    /// # Errors
    ///
    /// - Returns [`AuthError::Conflict`] if the email is already registered
    /// - Returns [`AuthError::Validation`] if the password is too short or the role unknown
    async fn register(&self, registration: Registration) -> Result<AuthResult, AuthError>;

    /// Verifies credentials and returns the account's API key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError>;

    /// Resolves an API key to the principal it belongs to: the user's email,
    /// or `"static"` for the configured key. `None` when nobody owns it.
    async fn authenticate(&self, api_key: &str) -> Result<Option<String>, AuthError>;
}
