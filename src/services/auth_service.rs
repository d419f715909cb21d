use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, Result},
    models::account::Role,
};

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

const PASSWORD_RESET_PURPOSE: &str = "password_reset";

/// Claims of the long-lived token that authorises a password reset.
/// `purpose` keeps session tokens from being accepted in its place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub sub: String,
    pub purpose: String,
    pub iat: i64,
    pub exp: i64,
}

/// Password hashing and token issuance
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiration: Option<TimeDelta>,
    verification_expiration: Option<TimeDelta>,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_expiration: TimeDelta::try_minutes(config.token_expiration_minutes),
            verification_expiration: TimeDelta::try_days(config.verification_expiration_days),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash).map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Issue a session token for `username` carrying its roles
    pub fn encode_token(&self, username: &str, roles: &[Role]) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role: roles.to_vec(),
            iat: now.timestamp(),
            exp: expires_at(now, self.token_expiration)?.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(token_error)
    }

    pub fn encode_verification_token(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = VerificationClaims {
            sub: username.to_string(),
            purpose: PASSWORD_RESET_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: expires_at(now, self.verification_expiration)?.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Returns the username the verification token was issued for
    pub fn decode_verification_token(&self, token: &str) -> Result<String> {
        let claims = decode::<VerificationClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(token_error)?;

        if claims.purpose != PASSWORD_RESET_PURPOSE {
            return Err(AppError::Auth("Invalid token".into()));
        }

        Ok(claims.sub)
    }
}

fn expires_at(now: DateTime<Utc>, lifetime: Option<TimeDelta>) -> Result<DateTime<Utc>> {
    lifetime
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AppError::Internal("token lifetime out of range".into()))
}

fn token_error(err: jsonwebtoken::errors::Error) -> AppError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AppError::Auth("Signature has expired".into()),
        _ => AppError::Auth("Invalid token".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(expiration_minutes: i64) -> Config {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_expiration_minutes: expiration_minutes,
            verification_expiration_days: 30,
            max_pool_size: 1,
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let auth = AuthService::new(&config(30));
        let hash = auth.hash_password("securepassword123").unwrap();

        assert_ne!(hash, "securepassword123");
        assert!(auth.verify_password("securepassword123", &hash).unwrap());
        assert!(!auth.verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn test_token_carries_subject_and_roles() {
        let auth = AuthService::new(&config(30));
        let token = auth
            .encode_token("alice", &[Role::Requestor, Role::Admin])
            .unwrap();

        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, vec![Role::Requestor, Role::Admin]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s validation leeway
        let auth = AuthService::new(&config(-10));
        let token = auth.encode_token("alice", &[Role::Requestor]).unwrap();

        let err = auth.decode_token(&token).unwrap_err();
        assert_eq!(err.to_string(), "Signature has expired");
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let auth = AuthService::new(&config(30));
        let mut other = config(30);
        other.jwt_secret = "another-secret".to_string();
        let token = AuthService::new(&other)
            .encode_token("alice", &[Role::Admin])
            .unwrap();

        let err = auth.decode_token(&token).unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");
        assert!(auth.decode_token("garbage").is_err());
    }

    #[test]
    fn test_unrepresentable_lifetime_is_an_error() {
        for minutes in [1_000_000_000_000, i64::MAX / 2] {
            let auth = AuthService::new(&config(minutes));
            let err = auth.encode_token("alice", &[Role::Admin]).unwrap_err();
            assert!(matches!(err, AppError::Internal(_)), "{minutes}");
        }

        let mut long_reset = config(30);
        long_reset.verification_expiration_days = i64::MAX / 2;
        let err = AuthService::new(&long_reset)
            .encode_verification_token("alice")
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_session_token_cannot_reset_password() {
        let auth = AuthService::new(&config(30));
        let session = auth.encode_token("alice", &[Role::Admin]).unwrap();

        let err = auth.decode_verification_token(&session).unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn test_verification_token() {
        let auth = AuthService::new(&config(30));
        let token = auth.encode_verification_token("alice").unwrap();
        assert_eq!(auth.decode_verification_token(&token).unwrap(), "alice");
    }
}
