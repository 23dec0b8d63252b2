//! User Handler
//!
//! Signup and signin. Both return a freshly issued token.

use std::sync::Arc;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::domain::{NewUser, Role, User};
use crate::error::{AppError, AppResult};
use crate::store::{Store, StoreError, UserStore};

use super::{AuthResult, SigninCommand, SignupCommand};

const MIN_PASSWORD_LEN: usize = 6;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const EMAIL_TAKEN: &str = "Email already exists";

/// Handler for user registration and login
pub struct UserHandler {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(format!("{} is required", field)))
}

impl UserHandler {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a client
    pub async fn signup(&self, command: SignupCommand) -> AppResult<AuthResult> {
        let first_name = required(command.first_name, "firstName")?;
        let last_name = required(command.last_name, "lastName")?;
        let email = required(command.email, "email")?;
        let password = command
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::bad_request("password is required"))?;
        let confirm_password = command
            .confirm_password
            .ok_or_else(|| AppError::bad_request("confirmPassword is required"))?;

        if !email.contains('@') {
            return Err(AppError::bad_request(INVALID_EMAIL));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::bad_request(PASSWORD_TOO_SHORT));
        }
        if password != confirm_password {
            return Err(AppError::bad_request(PASSWORD_MISMATCH));
        }

        let user = self
            .register(NewUser {
                first_name,
                last_name,
                email,
                password_hash: hash_password(&password),
                role: Role::Client,
                is_admin: false,
            })
            .await?;

        tracing::info!(user_id = user.id, "User signed up");
        self.auth_result(&user)
    }

    /// Check credentials and issue a token
    pub async fn signin(&self, command: SigninCommand) -> AppResult<AuthResult> {
        let email = required(command.email, "email")?;
        let password = command
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::bad_request("password is required"))?;

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .filter(|user| verify_password(&password, &user.password_hash))
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        tracing::info!(user_id = user.id, "User signed in");
        self.auth_result(&user)
    }

    /// Create the configured admin if no user holds that email yet
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<User> {
        if let Some(existing) = self.store.find_user_by_email(email).await? {
            return Ok(existing);
        }

        let admin = self
            .register(NewUser {
                first_name: "Banka".to_string(),
                last_name: "Admin".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password),
                role: Role::Admin,
                is_admin: true,
            })
            .await?;

        tracing::info!(user_id = admin.id, "Admin user created");
        Ok(admin)
    }

    async fn register(&self, new: NewUser) -> AppResult<User> {
        match self.store.insert_user(new).await {
            Ok(user) => Ok(user),
            Err(StoreError::Duplicate { .. }) => Err(AppError::Conflict(EMAIL_TAKEN.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn auth_result(&self, user: &User) -> AppResult<AuthResult> {
        Ok(AuthResult {
            token: self.tokens.issue(&user.identity())?,
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        })
    }
}
