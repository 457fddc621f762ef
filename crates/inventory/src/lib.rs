//! Inventory ledger domain module.
//!
//! The wire contract of the inventory service's ledger endpoint, the product
//! catalog shapes, and the pure rules for recording transactions and the stock
//! levels they produce (no IO, no HTTP, no storage).

pub mod catalog;
pub mod stock;
pub mod transaction;

pub use catalog::{Category, NewCategory, NewProduct, Product};
pub use stock::{StockLevels, StockOverflow};
pub use transaction::{
    InventoryTransaction, LedgerEntry, LedgerResponse, MoneyType, TransactionType,
};
