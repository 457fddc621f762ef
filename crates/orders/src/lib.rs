//! Orders domain module.
//!
//! This crate contains business rules for orders and their line items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). Referential checks against other services live in the
//! fulfillment workflow.

pub mod order;
pub mod report;

pub use order::{
    NewOrder, NewOrderItem, Order, OrderCode, OrderDraft, OrderItem, OrderItemDraft, OrderStatus,
};
pub use report::SalesSummary;
