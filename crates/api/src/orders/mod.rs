//! Order service: order creation through the fulfillment workflow, reads,
//! status changes, reconciliation and the sales report.
//!
//! Sits behind the gateway, which has already authenticated and authorized
//! the caller.

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post, put},
};

use stockroom_infra::{InventoryLedger, OrderFulfillment, OrderStore, ReferenceDirectory};

pub mod handlers;

pub type OrderWorkflow = OrderFulfillment<
    Arc<dyn OrderStore>,
    Arc<dyn ReferenceDirectory>,
    Arc<dyn InventoryLedger>,
>;

#[derive(Clone)]
pub struct OrdersState {
    pub workflow: Arc<OrderWorkflow>,
}

impl OrdersState {
    pub fn new(
        store: Arc<dyn OrderStore>,
        directory: Arc<dyn ReferenceDirectory>,
        ledger: Arc<dyn InventoryLedger>,
    ) -> Self {
        Self {
            workflow: Arc::new(OrderFulfillment::new(store, directory, ledger)),
        }
    }
}

pub fn router(state: OrdersState) -> Router {
    Router::new()
        .route("/health", get(crate::health))
        .route(
            "/orders",
            post(handlers::create_order).get(handlers::list_orders),
        )
        .route("/orders/:id", get(handlers::get_order))
        .route("/orders/:id/status", put(handlers::update_status))
        .route("/orders/:id/reconciliation", get(handlers::reconciliation))
        .route("/sale-report", get(handlers::sale_report))
        .layer(Extension(state))
}
