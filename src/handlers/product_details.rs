use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::Result,
    handlers::{
        AppState,
        auth::{AuthUser, ValidatedJson},
    },
    models::{
        DetailResponse,
        account::Role,
        product::{ProductDetails, ProductDetailsUpdate},
    },
};

const CATALOG_WRITERS: &[Role] = &[Role::Admin, Role::ProductionManager];

pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = state.products.get_all_products().await?;
    Ok((StatusCode::OK, Json(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(productid): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state.products.get_product(&productid).await?;
    Ok((StatusCode::OK, Json(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(product): ValidatedJson<ProductDetails>,
) -> Result<impl IntoResponse> {
    user.require_any_role(CATALOG_WRITERS, "create product details")?;

    state.products.create_product(&product).await?;
    tracing::info!(productid = %product.productid, by = %user.username, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partial update; only supplied fields change
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(productid): Path<String>,
    ValidatedJson(update): ValidatedJson<ProductDetailsUpdate>,
) -> Result<impl IntoResponse> {
    user.require_any_role(CATALOG_WRITERS, "update product details")?;

    let mut product = state.products.get_product(&productid).await?;
    update.apply(&mut product);
    state.products.update_product(&product).await?;

    tracing::info!(%productid, by = %user.username, "product updated");

    Ok((StatusCode::OK, Json(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(productid): Path<String>,
) -> Result<impl IntoResponse> {
    user.require_any_role(CATALOG_WRITERS, "delete product details")?;

    state.products.delete_product(&productid).await?;
    tracing::info!(%productid, by = %user.username, "product deleted");

    Ok((StatusCode::OK, Json(DetailResponse::new("Product deleted"))))
}
