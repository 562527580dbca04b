//! User account model, JWT claims and the registration password policy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Punctuation accepted by the password policy
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/";

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
}

/// Public registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct Signup {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub password: String,
    /// Password confirmation, must match `password`
    pub password2: String,
}

/// Create user request (administration)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Update user request (administration)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub password: Option<String>,
}

/// Kind of JWT being issued or verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub token_type: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token of the expected kind
    pub fn from_token(
        token: &str,
        secret: &str,
        expected: TokenKind,
    ) -> Result<Self, AppError> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Authentication(e.to_string()))?;

        let claims = token_data.claims;
        if claims.token_type != expected {
            return Err(AppError::Authentication("Wrong token type".to_string()));
        }
        Ok(claims)
    }

    /// Require staff privileges (catalogue and account administration)
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AppError::Permission(
                "Staff privileges required".to_string(),
            ))
        }
    }

    /// A reservation may be returned or cancelled by its owner or a superuser.
    pub fn can_manage_reservation(&self, owner_id: i32) -> bool {
        self.user_id == owner_id || self.is_superuser
    }
}

/// Validate a plaintext password against the registration policy.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(AppError::Validation(
            "Password must contain at least one special character".to_string(),
        ));
    }
    Ok(())
}

/// Normalize an email address before the uniqueness check: the domain part
/// is case-folded, the local part is kept as entered.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_rejected() {
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn password_needs_digit_upper_lower_symbol() {
        assert!(validate_password("abcdefgh").is_err()); // no digit/upper/symbol
        assert!(validate_password("ABCDEFG1!").is_err()); // no lowercase
        assert!(validate_password("abcdefg1!").is_err()); // no uppercase
        assert!(validate_password("Abcdefgh!").is_err()); // no digit
        assert!(validate_password("Abcdefg1").is_err()); // no symbol
    }

    #[test]
    fn compliant_password_accepted() {
        assert!(validate_password("Abcdef1!").is_ok());
    }

    #[test]
    fn email_domain_is_case_folded() {
        assert_eq!(normalize_email("Jane.Doe@EXAMPLE.ORG"), "Jane.Doe@example.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn token_roundtrip_preserves_claims() {
        let claims = UserClaims {
            sub: "jane@example.org".to_string(),
            user_id: 7,
            is_staff: false,
            is_superuser: false,
            token_type: TokenKind::Access,
            exp: chrono::Utc::now().timestamp() + 600,
            iat: chrono::Utc::now().timestamp(),
        };

        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret", TokenKind::Access).unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.sub, "jane@example.org");
    }

    #[test]
    fn refresh_token_rejected_where_access_expected() {
        let claims = UserClaims {
            sub: "jane@example.org".to_string(),
            user_id: 7,
            is_staff: false,
            is_superuser: false,
            token_type: TokenKind::Refresh,
            exp: chrono::Utc::now().timestamp() + 600,
            iat: chrono::Utc::now().timestamp(),
        };

        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret", TokenKind::Access).is_err());
    }

    #[test]
    fn owner_and_superuser_can_manage_reservation() {
        let owner = UserClaims {
            sub: "a@example.org".into(),
            user_id: 1,
            is_staff: false,
            is_superuser: false,
            token_type: TokenKind::Access,
            exp: 0,
            iat: 0,
        };
        let admin = UserClaims {
            sub: "root@example.org".into(),
            user_id: 2,
            is_staff: true,
            is_superuser: true,
            token_type: TokenKind::Access,
            exp: 0,
            iat: 0,
        };
        let stranger = UserClaims {
            sub: "c@example.org".into(),
            user_id: 3,
            is_staff: false,
            is_superuser: false,
            token_type: TokenKind::Access,
            exp: 0,
            iat: 0,
        };

        assert!(owner.can_manage_reservation(1));
        assert!(admin.can_manage_reservation(1));
        assert!(!stranger.can_manage_reservation(1));
    }
}
