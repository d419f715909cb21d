use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    db::{
        DbPool, account_store::AccountStore, inventory_store::InventoryStore,
        product_store::ProductStore, request_store::RequestStore,
    },
    services::AuthService,
};

pub mod accounts;
pub mod auth;
pub mod product_details;
pub mod product_inventory;
pub mod requests;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub products: ProductStore,
    pub inventory: InventoryStore,
    pub requests: RequestStore,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(pool: DbPool, auth: AuthService) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            products: ProductStore::new(pool.clone()),
            inventory: InventoryStore::new(pool.clone()),
            requests: RequestStore::new(pool),
            auth,
        }
    }
}

async fn health() -> &'static str {
    "Supply chain tracker server is running"
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route("/", get(accounts::list_accounts))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/reset-password", post(accounts::reset_password))
        .route("/reset-token", post(accounts::issue_reset_token))
        .route("/me", get(accounts::me));

    let productlog_routes = Router::new()
        .route(
            "/product-details",
            get(product_details::list_products).post(product_details::create_product),
        )
        .route(
            "/product-details/{productid}",
            get(product_details::get_product)
                .put(product_details::update_product)
                .delete(product_details::delete_product),
        )
        .route(
            "/product-inventory",
            get(product_inventory::list_inventory).post(product_inventory::create_inventory),
        )
        .route(
            "/product-inventory/{batchid}",
            get(product_inventory::get_inventory)
                .put(product_inventory::update_inventory)
                .delete(product_inventory::delete_inventory),
        )
        .route(
            "/product-inventory-details",
            get(product_inventory::list_inventory_details),
        );

    let request_routes = Router::new()
        .route(
            "/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/requests/{requestid}",
            get(requests::get_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/requests/{requestid}/approve", put(requests::approve_request))
        .route("/requests/{requestid}/reject", put(requests::reject_request))
        .route("/requests/{requestid}/fullfill", put(requests::fulfill_request));

    Router::new()
        .route("/", get(health))
        .nest("/accounts", account_routes)
        .nest("/productlog", productlog_routes)
        .nest("/productrequests", request_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
