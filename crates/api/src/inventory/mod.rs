//! Inventory service: catalog, the transaction ledger and stock on hand.
//!
//! The ledger endpoints answer in the `{success, data | error}` envelope the
//! order service's ledger client expects; the catalog endpoints use the
//! regular JSON error shape.

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use stockroom_infra::InventoryBook;

pub mod handlers;

#[derive(Clone)]
pub struct InventoryState {
    pub book: Arc<dyn InventoryBook>,
}

impl InventoryState {
    pub fn new(book: Arc<dyn InventoryBook>) -> Self {
        Self { book }
    }
}

pub fn router(state: InventoryState) -> Router {
    Router::new()
        .route("/health", get(crate::health))
        .route(
            "/inventory/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/inventory/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/inventory/products/:id", get(handlers::get_product))
        .route("/inventory/stock/:id", get(handlers::stock_on_hand))
        .route(
            "/inventory/transactions",
            get(handlers::list_transactions).post(handlers::record_transaction),
        )
        .layer(Extension(state))
}
