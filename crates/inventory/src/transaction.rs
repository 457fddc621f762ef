use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_core::{
    MAX_QUANTITY, Money, OrderId, ProductId, StaffId, SupplierId, TransactionId,
    ValidationErrors, is_storable,
};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
}

/// Direction of the money attached to a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoneyType {
    Income,
    Expense,
}

/// Request body of one ledger call.
///
/// `order_id` is a correlation id only: the inventory service has no way to
/// check it against the order service's storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_type: TransactionType,
    pub product_id: ProductId,
    pub quantity: i64,
    pub staff_id: StaffId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub money_type: Option<MoneyType>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LedgerEntry {
    pub fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.quantity < 1 {
            errors.add("quantity", "must be at least 1");
        } else if self.quantity > MAX_QUANTITY {
            errors.add("quantity", format!("must not exceed {MAX_QUANTITY}"));
        }
        match self.amount {
            Some(amount) if amount < Money::ZERO => {
                errors.add("amount", "must not be negative");
            }
            Some(amount) if !is_storable(amount) => {
                errors.add("amount", "must have at most 2 decimal places and fit 12 digits");
            }
            _ => {}
        }

        errors
    }
}

/// One recorded stock/money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    pub product_id: ProductId,
    pub quantity: i64,
    pub staff_id: StaffId,
    pub order_id: Option<OrderId>,
    pub supplier_id: Option<SupplierId>,
    pub amount: Option<Money>,
    pub money_type: Option<MoneyType>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryTransaction {
    pub fn record(id: TransactionId, entry: LedgerEntry, at: DateTime<Utc>) -> Self {
        Self {
            id,
            transaction_type: entry.transaction_type,
            product_id: entry.product_id,
            quantity: entry.quantity,
            staff_id: entry.staff_id,
            order_id: entry.order_id,
            supplier_id: entry.supplier_id,
            amount: entry.amount,
            money_type: entry.money_type,
            notes: entry.notes,
            created_at: at,
        }
    }

    /// Signed effect on the product's stock level. `None` only for a
    /// quantity that cannot be negated, which validation never lets through.
    pub fn stock_delta(&self) -> Option<i64> {
        match self.transaction_type {
            TransactionType::In => Some(self.quantity),
            TransactionType::Out => self.quantity.checked_neg(),
        }
    }
}

/// Response envelope of the ledger endpoint.
///
/// `{success: true, data: {...}}` or `{success: false, error: "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LedgerResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
