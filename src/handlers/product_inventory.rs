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
        auth::{AuthUser, ValidatedJson, ValidatedQuery},
    },
    models::{
        DetailResponse,
        account::Role,
        inventory::{InventoryFilter, ProductInventoryCreate, ProductInventoryUpdate},
    },
};

const INVENTORY_WRITERS: &[Role] = &[Role::Admin, Role::ProductionManager, Role::Producer];
const INVENTORY_ADMINS: &[Role] = &[Role::Admin, Role::ProductionManager];

pub async fn list_inventory(
    State(state): State<AppState>,
    ValidatedQuery(filter): ValidatedQuery<InventoryFilter>,
) -> Result<impl IntoResponse> {
    let batches = state.inventory.get_batches(&filter).await?;
    Ok((StatusCode::OK, Json(batches)))
}

/// Every batch with its product details embedded
pub async fn list_inventory_details(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let batches = state.inventory.get_batches_with_details().await?;
    Ok((StatusCode::OK, Json(batches)))
}

pub async fn get_inventory(
    State(state): State<AppState>,
    Path(batchid): Path<String>,
) -> Result<impl IntoResponse> {
    let batch = state.inventory.get_batch(&batchid).await?;
    Ok((StatusCode::OK, Json(batch)))
}

pub async fn create_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ProductInventoryCreate>,
) -> Result<impl IntoResponse> {
    user.require_any_role(INVENTORY_WRITERS, "create inventory")?;
    state.products.ensure_product_exists(&payload.productid).await?;

    let batch = payload.into_batch(&user.username);
    state.inventory.create_batch(&batch).await?;

    tracing::info!(
        batchid = %batch.batchid_internal,
        productid = %batch.productid,
        by = %user.username,
        "inventory batch created"
    );

    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn update_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(batchid): Path<String>,
    ValidatedJson(update): ValidatedJson<ProductInventoryUpdate>,
) -> Result<impl IntoResponse> {
    user.require_any_role(INVENTORY_WRITERS, "update inventory")?;

    let mut batch = state.inventory.get_batch(&batchid).await?;
    if let Some(productid) = &update.productid {
        state.products.ensure_product_exists(productid).await?;
    }

    update.apply(&mut batch, &user.username);
    state.inventory.update_batch(&batch).await?;

    tracing::info!(%batchid, by = %user.username, "inventory batch updated");

    Ok((StatusCode::OK, Json(batch)))
}

pub async fn delete_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(batchid): Path<String>,
) -> Result<impl IntoResponse> {
    user.require_any_role(INVENTORY_ADMINS, "delete inventory")?;

    state.inventory.delete_batch(&batchid).await?;
    tracing::info!(%batchid, by = %user.username, "inventory batch deleted");

    Ok((StatusCode::OK, Json(DetailResponse::new("Inventory batch deleted"))))
}
