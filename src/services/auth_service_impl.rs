//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::services::auth_service::{AuthError, AuthResult, AuthService, Registration};
use async_trait::async_trait;
use tracing::info;

const ROLES: [&str; 2] = ["user", "admin"];

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

impl From<User> for AuthResult {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            phone: user.phone,
            role: user.role,
            api_key: user.api_key,
            created_at: user.created_at,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<AuthResult, AuthError> {
        if registration.password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters long",
                self.security.min_password_length
            )));
        }

        let role = registration.role.unwrap_or_else(|| "user".to_string());
        if !ROLES.contains(&role.as_str()) {
            return Err(AuthError::Validation(format!("Unknown role '{role}'")));
        }

        let repo = self.store.user_repo();
        if repo.get_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let user = repo
            .create(
                NewUser {
                    email: registration.email,
                    phone: registration.phone,
                    password: registration.password,
                    role,
                },
                &self.security,
            )
            .await?;

        info!(user_id = user.id, role = %user.role, "Registered user");
        Ok(AuthResult::from(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        self.store
            .user_repo()
            .verify_password(email, password)
            .await?
            .map(AuthResult::from)
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn authenticate(&self, api_key: &str) -> Result<Option<String>, AuthError> {
        if self
            .security
            .api_key
            .as_deref()
            .is_some_and(|configured| configured == api_key)
        {
            return Ok(Some("static".to_string()));
        }

        Ok(self
            .store
            .verify_api_key(api_key)
            .await?
            .map(|user| user.email))
    }
}
