use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::{AppError, Result},
    handlers::{
        AppState,
        auth::{AuthUser, ValidatedJson},
    },
    models::account::{
        Account, AccountDto, LoginRequest, MessageResponse, RegisterRequest,
        ResetPasswordRequest, ResetTokenRequest, Role, TokenResponse,
    },
};

/// Handler for creating a new account
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let username = request.username.to_lowercase();
    let email = request.email.to_lowercase();

    if state.accounts.find_by_username(&username).await?.is_some() {
        return Err(AppError::BadRequest("Username already exists".into()));
    }
    if state.accounts.email_exists(&email).await? {
        return Err(AppError::BadRequest("Email already exists".into()));
    }

    let account = Account {
        password: state.auth.hash_password(&request.password)?,
        username,
        email,
        list_of_roles: request.list_of_roles,
        is_verified: false,
        created_at: Utc::now(),
        last_login: None,
    };
    state.accounts.create_account(&account).await?;

    tracing::info!(username = %account.username, roles = ?account.list_of_roles, "account registered");

    Ok((StatusCode::CREATED, Json(AccountDto::from(account))))
}

/// Handler for exchanging credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let account = state
        .accounts
        .get_by_username(&request.username.to_lowercase())
        .await?;

    if !state
        .auth
        .verify_password(&request.password, &account.password)?
    {
        tracing::warn!(username = %account.username, "failed login");
        return Err(AppError::Auth("Invalid credentials".into()));
    }

    state.accounts.update_last_login(&account.username).await?;
    let token = state
        .auth
        .encode_token(&account.username, &account.list_of_roles)?;

    tracing::info!(username = %account.username, "login");

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}

/// Handler for setting a new password with a verification token
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse> {
    let username = state.auth.decode_verification_token(&request.token)?;
    let account = state.accounts.get_by_username(&username).await?;

    let password_hash = state.auth.hash_password(&request.new_password)?;
    state
        .accounts
        .update_password(&account.username, &password_hash)
        .await?;

    tracing::info!(username = %account.username, "password reset");

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Password reset successfully".to_string(),
        }),
    ))
}

/// Handler for the caller's own account
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<impl IntoResponse> {
    let account = state.accounts.get_by_username(&user.username).await?;
    Ok((StatusCode::OK, Json(AccountDto::from(account))))
}

/// Handler for listing every account
pub async fn list_accounts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    user.require_any_role(&[Role::Admin], "list accounts")?;

    let accounts: Vec<AccountDto> = state
        .accounts
        .get_all_accounts()
        .await?
        .into_iter()
        .map(AccountDto::from)
        .collect();

    Ok((StatusCode::OK, Json(accounts)))
}

/// Handler for issuing a password-reset token on behalf of an account
pub async fn issue_reset_token(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<ResetTokenRequest>,
) -> Result<impl IntoResponse> {
    user.require_any_role(&[Role::Admin], "issue reset tokens")?;

    let account = state
        .accounts
        .get_by_username(&request.username.to_lowercase())
        .await?;
    let token = state.auth.encode_verification_token(&account.username)?;

    tracing::info!(username = %account.username, by = %user.username, "reset token issued");

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}
