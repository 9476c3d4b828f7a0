//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{UserRole, UserStatus};
use crate::error::AppError;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Short user representation for pickers and member lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

/// Technician with the teams they belong to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Technician {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    /// Comma-separated names of the active teams the technician is in
    pub team_names: Option<String>,
    /// Requests currently assigned and not yet closed
    pub open_requests: i64,
}

/// Fields needed to insert a user
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: UserRole,
}

/// Signup payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub role: Option<UserRole>,
}

/// Login payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Token issued at signup and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub role: UserRole,
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

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole, exp: i64) -> UserClaims {
        UserClaims {
            sub: "a@b.com".to_string(),
            user_id: 7,
            role,
            exp,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn token_round_trip_keeps_user_and_role() {
        let exp = Utc::now().timestamp() + 3600;
        let token = claims(UserRole::Technician, exp).create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.role, UserRole::Technician);
    }

    #[test]
    fn token_with_wrong_secret_or_expired_is_rejected() {
        let valid = claims(UserRole::User, Utc::now().timestamp() + 3600)
            .create_token("secret")
            .unwrap();
        assert!(UserClaims::from_token(&valid, "other").is_err());

        let expired = claims(UserRole::User, Utc::now().timestamp() - 3600)
            .create_token("secret")
            .unwrap();
        assert!(UserClaims::from_token(&expired, "secret").is_err());
    }

    #[test]
    fn claims_use_user_id_key() {
        let json = serde_json::to_value(claims(UserRole::Admin, 0)).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn only_admins_pass_admin_check() {
        assert!(claims(UserRole::Admin, 0).require_admin().is_ok());
        assert!(claims(UserRole::Manager, 0).require_admin().is_err());
    }
}
