use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{error::AppError, handlers::AppState, models::account::Role};

/// Caller identity decoded from the `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|role| self.has_role(*role))
    }

    /// 403 unless the caller holds at least one of `allowed`
    pub fn require_any_role(&self, allowed: &[Role], action: &str) -> Result<(), AppError> {
        if self.has_any_role(allowed) {
            return Ok(());
        }
        tracing::warn!(username = %self.username, %action, "permission denied");
        Err(AppError::Forbidden(format!(
            "You do not have permission to {action}"
        )))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;

        let claims = state.auth.decode_token(token)?;

        Ok(AuthUser {
            username: claims.sub,
            roles: claims.role,
        })
    }
}

/// JSON body that has passed its `validator` rules.
/// Malformed JSON and failed validation both answer 422.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(format!("Validation failed: {e}")))?;

        Ok(ValidatedJson(value))
    }
}

/// Query string whose rejections answer 422 with a `{"detail"}` body
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        Ok(ValidatedQuery(value))
    }
}
