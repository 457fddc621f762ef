//! Consistent JSON error responses: `{ "error": code, "message": text }`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use stockroom_auth::{AuthzError, CacheError, TokenError};
use stockroom_core::{DomainError, ValidationErrors};
use stockroom_infra::{
    FulfillmentError, InventoryBookError, OrderStoreError, ReconciliationError,
};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    BadGateway(String),

    /// Logged in full; the client only sees a generic message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation_error",
                    "message": errors.to_string(),
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::BadGateway(msg) => json_error(StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "internal server error",
                )
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidFields(errors) => ApiError::Validation(errors),
            DomainError::NotFound => ApiError::NotFound("not found".to_string()),
            DomainError::InvalidId(msg) => ApiError::BadRequest(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(value: TokenError) -> Self {
        ApiError::Unauthorized(value.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(value: AuthzError) -> Self {
        ApiError::Forbidden(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add("body", value.body_text());
        ApiError::Validation(errors)
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(value: FulfillmentError) -> Self {
        match value {
            FulfillmentError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<OrderStoreError> for ApiError {
    fn from(value: OrderStoreError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<ReconciliationError> for ApiError {
    fn from(value: ReconciliationError) -> Self {
        match value {
            ReconciliationError::OrderNotFound(_) => ApiError::not_found("order"),
            ReconciliationError::Ledger(e) => ApiError::BadGateway(e.to_string()),
            ReconciliationError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<InventoryBookError> for ApiError {
    fn from(value: InventoryBookError) -> Self {
        match value {
            InventoryBookError::UnknownCategory(_) => field_error("category_id", value.to_string()),
            InventoryBookError::UnknownProduct(_) => field_error("product_id", value.to_string()),
            InventoryBookError::StockOverflow(_) => field_error("quantity", value.to_string()),
            InventoryBookError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(value: CacheError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

fn field_error(field: &str, message: String) -> ApiError {
    let mut errors = ValidationErrors::new();
    errors.add(field, message);
    ApiError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use stockroom_core::ProductId;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_carry_field_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("customer_id", "selected customer does not exist");

        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["errors"]["customer_id"][0], "selected customer does not exist");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = ApiError::Internal("connection refused (db:5432)".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "internal server error");
    }

    #[test]
    fn token_errors_map_to_401() {
        let response = ApiError::from(TokenError::NoToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn stock_overflow_is_a_quantity_field_error() {
        let err = ApiError::from(InventoryBookError::StockOverflow(ProductId::new(10)));
        let ApiError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("quantity"));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
