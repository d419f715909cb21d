use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Role tag carried on an account and inside its session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Requestor,
    Shipper,
    Producer,
    ProductionManager,
    RequestApprover,
    Fulfiller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Requestor => "REQUESTOR",
            Role::Shipper => "SHIPPER",
            Role::Producer => "PRODUCER",
            Role::ProductionManager => "PRODUCTION_MANAGER",
            Role::RequestApprover => "REQUEST_APPROVER",
            Role::Fulfiller => "FULFILLER",
        }
    }
}

/// Database account model
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub username: String,
    /// argon2 PHC string
    pub password: String,
    pub email: String,
    #[sqlx(json)]
    pub list_of_roles: Vec<Role>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// JSON representation of an account for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDto {
    pub username: String,
    pub email: String,
    pub list_of_roles: Vec<Role>,
    pub is_verified: bool,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            email: account.email,
            list_of_roles: account.list_of_roles,
            is_verified: account.is_verified,
        }
    }
}

/// Registration payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    pub password: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub list_of_roles: Vec<Role>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < 3 || !username.chars().all(char::is_alphanumeric) {
        let mut err = ValidationError::new("username");
        err.message =
            Some("Username must be alphanumeric and at least 3 characters long.".into());
        return Err(err);
    }
    Ok(())
}

/// Login payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Password reset payload, authorised by a verification token
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    pub new_password: String,
}

/// Request for a verification token on behalf of another account
#[derive(Debug, Deserialize, Validate)]
pub struct ResetTokenRequest {
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
