use chrono::{TimeDelta, Utc};
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_expiration_minutes: i64,
    pub verification_expiration_days: i64,
    pub max_pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://sctracker.db".to_string()),
            jwt_secret: env::var("SECRET_KEY").map_err(|_| ConfigError::Missing("SECRET_KEY"))?,
            token_expiration_minutes: parse_expiration(
                "EXPIRE_TIME_MINUTE",
                &env::var("EXPIRE_TIME_MINUTE").unwrap_or_else(|_| "30".to_string()),
                TimeDelta::try_minutes,
            )?,
            verification_expiration_days: parse_expiration(
                "VERIFICATION_EXPIRE_DAYS",
                &env::var("VERIFICATION_EXPIRE_DAYS").unwrap_or_else(|_| "30".to_string()),
                TimeDelta::try_days,
            )?,
            max_pool_size: env::var("MAX_POOL_SIZE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("MAX_POOL_SIZE"))?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// A positive lifetime that still yields a representable expiry timestamp
fn parse_expiration(
    name: &'static str,
    raw: &str,
    to_delta: fn(i64) -> Option<TimeDelta>,
) -> Result<i64, ConfigError> {
    let value: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber(name))?;

    let representable = value > 0
        && to_delta(value)
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .is_some();
    if !representable {
        return Err(ConfigError::OutOfRange(name));
    }

    Ok(value)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be a number")]
    InvalidNumber(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_accepts_defaults() {
        assert_eq!(
            parse_expiration("EXPIRE_TIME_MINUTE", "30", TimeDelta::try_minutes).unwrap(),
            30
        );
        assert_eq!(
            parse_expiration("VERIFICATION_EXPIRE_DAYS", "30", TimeDelta::try_days).unwrap(),
            30
        );
    }

    #[test]
    fn test_expiration_rejects_unrepresentable_lifetimes() {
        for raw in ["1000000000000", "4611686018427387903", "0", "-5"] {
            let err =
                parse_expiration("EXPIRE_TIME_MINUTE", raw, TimeDelta::try_minutes).unwrap_err();
            assert!(matches!(err, ConfigError::OutOfRange("EXPIRE_TIME_MINUTE")), "{raw}");
        }
        assert!(matches!(
            parse_expiration("VERIFICATION_EXPIRE_DAYS", "999999999999", TimeDelta::try_days),
            Err(ConfigError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_expiration_rejects_garbage() {
        assert!(matches!(
            parse_expiration("EXPIRE_TIME_MINUTE", "thirty", TimeDelta::try_minutes),
            Err(ConfigError::InvalidNumber("EXPIRE_TIME_MINUTE"))
        ));
    }
}
