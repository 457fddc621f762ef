//! Order persistence boundary.
//!
//! An order and its items are written together or not at all; readers never
//! observe an order without its items.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use r#trait::{OrderStore, OrderStoreError};
