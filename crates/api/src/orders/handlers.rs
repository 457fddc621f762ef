use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use stockroom_core::{DomainError, OrderId, ValidationErrors};
use stockroom_infra::{ReconciliationReport, reconcile_order};
use stockroom_orders::{NewOrder, Order, OrderStatus, SalesSummary};

use crate::errors::ApiError;

use super::OrdersState;

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("invalid order id".to_string()))
}

pub async fn create_order(
    Extension(state): Extension<OrdersState>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(input) = body?;
    let order = state.workflow.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(Extension(state): Extension<OrdersState>) -> Result<Json<Value>, ApiError> {
    let orders = state.workflow.store().list().await?;
    Ok(Json(json!({ "items": orders })))
}

pub async fn get_order(
    Extension(state): Extension<OrdersState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = parse_order_id(&id)?;
    state
        .workflow
        .store()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("order"))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Status only; subtotals and totals are never recomputed.
pub async fn update_status(
    Extension(state): Extension<OrdersState>,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let id = parse_order_id(&id)?;
    let Json(update) = body?;

    let status: OrderStatus = update.status.parse().map_err(|e| {
        let message = match e {
            DomainError::Validation(msg) => msg,
            other => other.to_string(),
        };
        let mut errors = ValidationErrors::new();
        errors.add("status", message);
        ApiError::Validation(errors)
    })?;

    let order = state
        .workflow
        .store()
        .update_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("order"))?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
    Ok(Json(order))
}

pub async fn reconciliation(
    Extension(state): Extension<OrdersState>,
    Path(id): Path<String>,
) -> Result<Json<ReconciliationReport>, ApiError> {
    let id = parse_order_id(&id)?;
    let report = reconcile_order(state.workflow.store(), state.workflow.ledger(), id).await?;
    Ok(Json(report))
}

pub async fn sale_report(
    Extension(state): Extension<OrdersState>,
) -> Result<Json<SalesSummary>, ApiError> {
    let orders = state.workflow.store().list().await?;
    Ok(Json(SalesSummary::from_orders(&orders)))
}
