use axum::{
    Extension, Json,
    extract::{Path, Query, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use stockroom_core::{OrderId, ProductId};
use stockroom_infra::InventoryBookError;
use stockroom_inventory::{
    Category, LedgerEntry, LedgerResponse, NewCategory, NewProduct, Product,
};

use crate::errors::ApiError;

use super::InventoryState;

fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("invalid product id".to_string()))
}

pub async fn create_category(
    Extension(state): Extension<InventoryState>,
    body: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(input) = body?;
    input.field_errors().into_result()?;

    let category = state.book.create_category(input)?;
    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    Extension(state): Extension<InventoryState>,
) -> Result<Json<Value>, ApiError> {
    let categories = state.book.list_categories()?;
    Ok(Json(json!({ "items": categories })))
}

pub async fn create_product(
    Extension(state): Extension<InventoryState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(input) = body?;
    input.field_errors().into_result()?;

    let product = state.book.create_product(input)?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    Extension(state): Extension<InventoryState>,
) -> Result<Json<Value>, ApiError> {
    let products = state.book.list_products()?;
    Ok(Json(json!({ "items": products })))
}

pub async fn get_product(
    Extension(state): Extension<InventoryState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&id)?;
    state
        .book
        .get_product(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product"))
}

pub async fn stock_on_hand(
    Extension(state): Extension<InventoryState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_product_id(&id)?;
    let on_hand = state
        .book
        .on_hand(id)?
        .ok_or_else(|| ApiError::not_found("product"))?;
    Ok(Json(json!({ "product_id": id, "on_hand": on_hand })))
}

fn ledger_failure(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<LedgerResponse>) {
    (status, Json(LedgerResponse::failure(error)))
}

pub async fn record_transaction(
    Extension(state): Extension<InventoryState>,
    body: Result<Json<LedgerEntry>, JsonRejection>,
) -> (StatusCode, Json<LedgerResponse>) {
    let entry = match body {
        Ok(Json(entry)) => entry,
        Err(rejection) => {
            return ledger_failure(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let errors = entry.field_errors();
    if !errors.is_empty() {
        return ledger_failure(StatusCode::UNPROCESSABLE_ENTITY, errors.to_string());
    }

    match state.book.record(entry) {
        Ok(tx) => {
            tracing::info!(
                transaction_id = %tx.id,
                product_id = %tx.product_id,
                transaction_type = ?tx.transaction_type,
                quantity = tx.quantity,
                "inventory transaction recorded"
            );
            match serde_json::to_value(&tx) {
                Ok(data) => (StatusCode::CREATED, Json(LedgerResponse::ok(data))),
                Err(e) => ledger_failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            }
        }
        Err(
            err @ (InventoryBookError::UnknownProduct(_) | InventoryBookError::StockOverflow(_)),
        ) => {
            ledger_failure(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to record inventory transaction");
            ledger_failure(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionFilter {
    pub order_id: Option<String>,
}

pub async fn list_transactions(
    Extension(state): Extension<InventoryState>,
    Query(filter): Query<TransactionFilter>,
) -> (StatusCode, Json<Value>) {
    let order_id = match filter.order_id.as_deref().map(str::parse::<OrderId>) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "success": false, "error": "order_id must be an integer" })),
            );
        }
    };

    match state.book.transactions(order_id) {
        Ok(txs) => (StatusCode::OK, Json(json!({ "success": true, "data": txs }))),
        Err(err) => {
            tracing::error!(error = %err, "failed to list inventory transactions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "internal server error" })),
            )
        }
    }
}
