use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::{AppError, Result},
    handlers::{
        AppState,
        auth::{AuthUser, ValidatedJson, ValidatedQuery},
    },
    models::{
        DetailResponse,
        account::Role,
        request::{
            RequestAction, RequestDetailsCreate, RequestDetailsUpdate, RequestFilter,
            RequestStatus,
        },
    },
};

const REQUEST_MANAGERS: &[Role] = &[Role::Admin, Role::ProductionManager];

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<RequestDetailsCreate>,
) -> Result<impl IntoResponse> {
    user.require_any_role(&[Role::Requestor], "create requests")?;
    state
        .products
        .ensure_product_exists(&payload.requestproductid)
        .await?;

    let request = payload.into_request(&user.username);
    state.requests.create_request(&request).await?;

    tracing::info!(
        requestid = %request.requestid,
        productid = %request.requestproductid,
        by = %user.username,
        "request created"
    );

    let response = state
        .requests
        .get_request_with_product(&request.requestid)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedQuery(filter): ValidatedQuery<RequestFilter>,
) -> Result<impl IntoResponse> {
    user.require_any_role(REQUEST_MANAGERS, "list requests")?;

    let requests = state.requests.get_requests(&filter).await?;
    Ok((StatusCode::OK, Json(requests)))
}

pub async fn get_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(requestid): Path<String>,
) -> Result<impl IntoResponse> {
    let request = state.requests.get_request_with_product(&requestid).await?;

    if !user.has_any_role(REQUEST_MANAGERS) && request.requestorname != user.username {
        return Err(AppError::Forbidden(
            "You do not have permission to view this request".into(),
        ));
    }

    Ok((StatusCode::OK, Json(request)))
}

/// Managers may edit in any state; the requestor only while PENDING
pub async fn update_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(requestid): Path<String>,
    ValidatedJson(update): ValidatedJson<RequestDetailsUpdate>,
) -> Result<impl IntoResponse> {
    let mut request = state.requests.get_request(&requestid).await?;

    if !user.has_any_role(REQUEST_MANAGERS) {
        if request.requestorname != user.username {
            return Err(AppError::Forbidden(
                "You do not have permission to update this request".into(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::BadRequest(
                "Request can only be edited while PENDING.".into(),
            ));
        }
    }

    if let Some(productid) = &update.requestproductid {
        state.products.ensure_product_exists(productid).await?;
    }

    let observed = request.status;
    update.apply(&mut request);
    state.requests.update_request(&request, observed).await?;

    tracing::info!(%requestid, by = %user.username, "request updated");

    let response = state.requests.get_request_with_product(&requestid).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn delete_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(requestid): Path<String>,
) -> Result<impl IntoResponse> {
    user.require_any_role(REQUEST_MANAGERS, "delete requests")?;

    state.requests.delete_request(&requestid).await?;
    tracing::info!(%requestid, by = %user.username, "request deleted");

    Ok((StatusCode::OK, Json(DetailResponse::new("Request deleted"))))
}

async fn transition(
    state: AppState,
    user: AuthUser,
    requestid: String,
    action: RequestAction,
) -> Result<impl IntoResponse> {
    user.require_any_role(&[action.required_role()], &format!("{} requests", action.verb()))?;

    let response = state
        .requests
        .transition(&requestid, action, &user.username)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn approve_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(requestid): Path<String>,
) -> Result<impl IntoResponse> {
    transition(state, user, requestid, RequestAction::Approve).await
}

pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(requestid): Path<String>,
) -> Result<impl IntoResponse> {
    transition(state, user, requestid, RequestAction::Reject).await
}

pub async fn fulfill_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(requestid): Path<String>,
) -> Result<impl IntoResponse> {
    transition(state, user, requestid, RequestAction::Fulfill).await
}
