use chrono::Utc;
use sqlx::types::Json;

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::account::Account,
};

/// Account store for database operations
#[derive(Clone)]
pub struct AccountStore {
    pool: DbPool,
}

impl AccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a list of all accounts
    pub async fn get_all_accounts(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY username")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(accounts)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(account)
    }

    /// Get an account by username, failing with 404 if it does not exist
    pub async fn get_by_username(&self, username: &str) -> Result<Account> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".into()))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count.0 > 0)
    }

    /// Insert a new account. Uniqueness is checked by the caller.
    pub async fn create_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (username, password, email, list_of_roles, is_verified, created_at, last_login)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.username)
        .bind(&account.password)
        .bind(&account.email)
        .bind(Json(&account.list_of_roles))
        .bind(account.is_verified)
        .bind(account.created_at)
        .bind(account.last_login)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    pub async fn update_last_login(&self, username: &str) -> Result<()> {
        sqlx::query("UPDATE accounts SET last_login = ? WHERE username = ?")
            .bind(Utc::now())
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, username: &str, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET password = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Account not found".into()));
        }

        Ok(())
    }
}
