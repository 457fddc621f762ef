//! `stockroom-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult, ValidationErrors};
pub use id::{
    CategoryId, CustomerId, OrderId, OrderItemId, ProductId, StaffId, SupplierId,
    TransactionId,
};
pub use money::{
    MAX_QUANTITY, MONEY_SCALE, Money, checked_total, is_storable, line_amount, max_amount,
    to_money_scale,
};
