//! Infrastructure layer: storage adapters, external service clients, caches
//! and the application workflows that compose them.

pub mod directory;
pub mod external;
pub mod fulfillment;
pub mod inventory_book;
pub mod order_store;
pub mod permission_cache;
pub mod reconciliation;

pub use directory::{DirectoryError, DirectorySeed, InMemoryDirectory, ReferenceDirectory};
pub use external::{HttpInventoryLedger, InventoryLedger, LedgerClientError};
pub use fulfillment::{FulfillmentError, OrderFulfillment};
pub use inventory_book::{InMemoryInventoryBook, InventoryBook, InventoryBookError};
pub use order_store::{InMemoryOrderStore, OrderStore, OrderStoreError};
pub use permission_cache::InMemoryPermissionCache;
pub use reconciliation::{ReconciliationError, ReconciliationReport, UnrecordedItem, reconcile_order};
