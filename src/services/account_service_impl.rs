//! `SeaORM` implementation of the `AccountService` trait.

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store};
use crate::services::account_service::{
    AccountError, AccountService, LoginResult, NewAccount, RegisteredUser,
};
use async_trait::async_trait;

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, account: NewAccount) -> Result<RegisteredUser, AccountError> {
        // Fast-path duplicate check; the unique indexes catch the race
        // where two registrations pass this check concurrently.
        let exists = self
            .store
            .user_exists(&account.username, &account.email)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        if exists {
            return Err(AccountError::Conflict(
                "User with this username or email already exists".to_string(),
            ));
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    username: account.username,
                    password: account.password,
                    email: account.email,
                    phone_number: account.phone_number,
                },
                &self.security,
            )
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    AccountError::Conflict(
                        "User with this username or email already exists".to_string(),
                    )
                } else {
                    AccountError::Database(e.to_string())
                }
            })?;

        Ok(RegisteredUser {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            created_at: user.created_at,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AccountError> {
        let is_valid = self
            .store
            .verify_user_password(email, password)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::UserNotFound)?;

        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::UserNotFound)?;

        Ok(LoginResult {
            email: user.email,
            username: user.username,
        })
    }
}
