use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_core::{
    CustomerId, DomainError, MAX_QUANTITY, MONEY_SCALE, Money, OrderId, OrderItemId, ProductId,
    StaffId, ValidationErrors, checked_total, is_storable, line_amount, to_money_scale,
};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    /// Orders are recorded at the point of sale, so this is the creation default.
    #[default]
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "status must be one of: pending, completed, cancelled (got '{other}')"
            ))),
        }
    }
}

/// Human-readable order code (unique per order service).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// `ORD-YYYYMMDD-XXXXXXXX`, the suffix taken from the random tail of a
    /// UUIDv7 so codes generated in the same instant still differ.
    pub fn generate(at: DateTime<Utc>) -> Self {
        let uuid = Uuid::now_v7().simple().to_string();
        let suffix = &uuid[uuid.len() - 8..];
        Self(format!("ORD-{}-{}", at.format("%Y%m%d"), suffix.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Order-creation request, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl NewOrder {
    /// Shape checks that need no lookups: non-empty items, `1 <= quantity <=
    /// MAX_QUANTITY`, `unit_price >= 0` and storable as `NUMERIC(14, 2)`,
    /// non-blank explicit code.
    ///
    /// Messages are keyed by field path (`items.0.quantity`).
    pub fn shape_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.items.is_empty() {
            errors.add("items", "at least one item is required");
        }

        for (idx, item) in self.items.iter().enumerate() {
            if item.quantity < 1 {
                errors.add(format!("items.{idx}.quantity"), "must be at least 1");
            } else if item.quantity > MAX_QUANTITY {
                errors.add(
                    format!("items.{idx}.quantity"),
                    format!("must not exceed {MAX_QUANTITY}"),
                );
            }
            if item.unit_price < Money::ZERO {
                errors.add(format!("items.{idx}.unit_price"), "must not be negative");
            } else if item.unit_price.normalize().scale() > MONEY_SCALE {
                errors.add(
                    format!("items.{idx}.unit_price"),
                    format!("must have at most {MONEY_SCALE} decimal places"),
                );
            } else if !is_storable(item.unit_price) {
                errors.add(format!("items.{idx}.unit_price"), "is too large");
            }
        }

        if let Some(code) = &self.code {
            if code.trim().is_empty() {
                errors.add("code", "must not be blank");
            }
        }

        errors
    }

    /// Resolve defaults and derived amounts into a record ready to persist.
    ///
    /// Call [`NewOrder::shape_errors`] first. The only errors reported here
    /// are derived amounts (a line subtotal or the order total) that overflow
    /// or do not fit the stored `NUMERIC(14, 2)`.
    pub fn into_draft(self, now: DateTime<Utc>) -> Result<OrderDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut items = Vec::with_capacity(self.items.len());

        for (idx, item) in self.items.into_iter().enumerate() {
            let subtotal = line_amount(item.unit_price, item.quantity)
                .filter(|amount| is_storable(*amount));
            let Some(subtotal) = subtotal else {
                errors.add(format!("items.{idx}"), "line amount is too large");
                continue;
            };
            items.push(OrderItemDraft {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: to_money_scale(item.unit_price),
                subtotal: to_money_scale(subtotal),
            });
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let Some(total_amount) = checked_total(items.iter().map(|i| i.subtotal))
            .filter(|t| is_storable(*t))
            .map(to_money_scale)
        else {
            errors.add("items", "order total is too large");
            return Err(errors);
        };

        Ok(OrderDraft {
            code: self
                .code
                .map(|c| OrderCode::new(c.trim()))
                .unwrap_or_else(|| OrderCode::generate(now)),
            customer_id: self.customer_id,
            staff_id: self.staff_id,
            total_amount,
            status: self.status.unwrap_or_default(),
            order_date: self.order_date.unwrap_or(now),
            created_at: now,
            items,
        })
    }
}

/// An order with every default and derived value resolved, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub code: OrderCode,
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl OrderItemDraft {
    pub fn into_item(self, id: OrderItemId, order_id: OrderId) -> OrderItem {
        OrderItem {
            id,
            order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            subtotal: self.subtotal,
        }
    }
}

/// Persisted order line.
///
/// `subtotal` is fixed at creation; nothing recomputes it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl OrderItem {
    /// Money moved by this line: the subtotal fixed at creation
    /// (`unit_price × quantity`).
    pub fn amount(&self) -> Money {
        self.subtotal
    }
}

/// Persisted order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub code: OrderCode,
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Assemble a persisted order from its draft and store-assigned ids.
    pub fn from_draft(id: OrderId, draft: OrderDraft, item_ids: &[OrderItemId]) -> Self {
        let items = draft
            .items
            .into_iter()
            .zip(item_ids.iter().copied())
            .map(|(item, item_id)| item.into_item(item_id, id))
            .collect();

        Self {
            id,
            code: draft.code,
            customer_id: draft.customer_id,
            staff_id: draft.staff_id,
            total_amount: draft.total_amount,
            status: draft.status,
            order_date: draft.order_date,
            created_at: draft.created_at,
            updated_at: draft.created_at,
            items,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, OrderStatus::Completed)
    }
}
