//! Account management and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        normalize_email, validate_password, CreateUser, Signup, TokenKind, UpdateUser, User,
        UserClaims,
    },
    repository::Repository,
};

/// Access token plus the refresh token destined for the cookie
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct AccountsService {
    repository: Repository,
    config: AuthConfig,
}

impl AccountsService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account from a public signup request
    pub async fn register(&self, signup: Signup) -> AppResult<User> {
        signup
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if signup.password != signup.password2 {
            return Err(AppError::Validation(
                "Passwords do not match".to_string(),
            ));
        }
        validate_password(&signup.password)?;

        let email = normalize_email(&signup.email);
        if self.repository.users.email_exists(&email, None).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(&signup.password)?;
        let user = CreateUser {
            email,
            first_name: signup.first_name,
            last_name: signup.last_name,
            date_of_birth: signup.date_of_birth,
            password: String::new(), // hash passed separately
            is_staff: false,
            is_superuser: false,
        };

        self.repository.users.create(&user, &password_hash).await
    }

    /// Authenticate by email and password, issuing a token pair
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let email = normalize_email(email);
        let user = self
            .repository
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Authentication("Incorrect email or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication(
                "Account is deactivated".to_string(),
            ));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Incorrect email or password".to_string(),
            ));
        }

        let tokens = self.issue_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Issue a fresh access/refresh token pair for a user
    pub fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let access = self.create_token(
            user,
            TokenKind::Access,
            (self.config.access_token_minutes * 60) as i64,
        )?;
        let refresh = self.create_token(
            user,
            TokenKind::Refresh,
            self.config.refresh_token_seconds as i64,
        )?;
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a valid refresh token for a new access token
    pub async fn refresh_access(&self, refresh_token: &str) -> AppResult<String> {
        let claims =
            UserClaims::from_token(refresh_token, &self.config.jwt_secret, TokenKind::Refresh)
                .map_err(|_| AppError::Authentication("Invalid refresh token".to_string()))?;

        // Re-read the account so role or status changes take effect
        let user = self.repository.users.get_by_id(claims.user_id).await?;
        if !user.is_active {
            return Err(AppError::Authentication(
                "Account is deactivated".to_string(),
            ));
        }

        self.create_token(
            &user,
            TokenKind::Access,
            (self.config.access_token_minutes * 60) as i64,
        )
    }

    fn create_token(&self, user: &User, kind: TokenKind, lifetime_secs: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            token_type: kind,
            exp: now + lifetime_secs,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users (administration)
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a user with explicit role flags (administration)
    pub async fn create_user(&self, mut user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_password(&user.password)?;

        user.email = normalize_email(&user.email);
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(&user.password)?;
        self.repository.users.create(&user, &password_hash).await
    }

    /// Update an existing user (administration)
    pub async fn update_user(&self, id: i32, mut user: UpdateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.users.get_by_id(id).await?;

        if let Some(ref email) = user.email {
            let email = normalize_email(email);
            if self.repository.users.email_exists(&email, Some(id)).await? {
                return Err(AppError::Conflict(
                    "An account with this email already exists".to_string(),
                ));
            }
            user.email = Some(email);
        }

        let password_hash = match user.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.hash_password(password)?)
            }
            None => None,
        };

        self.repository.users.update(id, &user, password_hash).await
    }

    /// Delete a user (administration)
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await
    }

    /// Verify a plaintext password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
