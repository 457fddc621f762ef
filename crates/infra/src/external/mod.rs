//! External service clients.

pub mod inventory_ledger;

pub use inventory_ledger::{HttpInventoryLedger, InventoryLedger, LedgerClientError};
