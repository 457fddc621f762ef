//! Order ↔ inventory ledger reconciliation.
//!
//! `order_id` on a ledger transaction is a correlation id with no referential
//! integrity behind it, and the fulfillment fan-out absorbs failures. This
//! read-only check lists order items that have no matching `out` movement.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use stockroom_core::{OrderId, OrderItemId, ProductId};
use stockroom_inventory::{InventoryTransaction, TransactionType};
use stockroom_orders::{Order, OrderCode};

use crate::external::{InventoryLedger, LedgerClientError};
use crate::order_store::{OrderStore, OrderStoreError};

#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error(transparent)]
    Store(#[from] OrderStoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerClientError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecordedItem {
    pub order_item_id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub order_id: OrderId,
    pub code: OrderCode,
    pub item_count: usize,
    pub recorded_count: usize,
    pub unrecorded: Vec<UnrecordedItem>,
}

impl ReconciliationReport {
    pub fn in_sync(&self) -> bool {
        self.unrecorded.is_empty()
    }

    /// Match each item to one unused `out` transaction of the same product and
    /// quantity.
    pub fn compare(order: &Order, transactions: &[InventoryTransaction]) -> Self {
        let mut used = vec![false; transactions.len()];
        let mut unrecorded = Vec::new();

        for item in &order.items {
            let hit = transactions.iter().zip(&used).position(|(tx, taken)| {
                !taken
                    && tx.transaction_type == TransactionType::Out
                    && tx.product_id == item.product_id
                    && tx.quantity == item.quantity
            });
            match hit {
                Some(idx) => used[idx] = true,
                None => unrecorded.push(UnrecordedItem {
                    order_item_id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                }),
            }
        }

        Self {
            order_id: order.id,
            code: order.code.clone(),
            item_count: order.items.len(),
            recorded_count: order.items.len() - unrecorded.len(),
            unrecorded,
        }
    }
}

#[instrument(skip(store, ledger), fields(order_id = %order_id), err)]
pub async fn reconcile_order<S, L>(
    store: &S,
    ledger: &L,
    order_id: OrderId,
) -> Result<ReconciliationReport, ReconciliationError>
where
    S: OrderStore + ?Sized,
    L: InventoryLedger + ?Sized,
{
    let order = store
        .get(order_id)
        .await?
        .ok_or(ReconciliationError::OrderNotFound(order_id))?;
    let transactions = ledger.list_for_order(order_id).await?;
    Ok(ReconciliationReport::compare(&order, &transactions))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use stockroom_core::{CustomerId, StaffId, TransactionId};
    use stockroom_inventory::LedgerEntry;
    use stockroom_orders::{NewOrder, NewOrderItem};

    use super::*;
    use crate::fulfillment::ledger_entry;

    fn order(lines: &[(i64, i64)]) -> Order {
        let draft = NewOrder {
            customer_id: CustomerId::new(7),
            staff_id: StaffId::new(3),
            items: lines
                .iter()
                .map(|(product, qty)| NewOrderItem {
                    product_id: ProductId::new(*product),
                    quantity: *qty,
                    unit_price: Decimal::new(100, 2),
                })
                .collect(),
            code: Some("ORD-R".to_string()),
            order_date: None,
            status: None,
        }
        .into_draft(Utc::now())
        .unwrap();
        let ids: Vec<OrderItemId> = (1..=lines.len() as i64).map(OrderItemId::new).collect();
        Order::from_draft(OrderId::new(5), draft, &ids)
    }

    fn recorded(id: i64, entry: LedgerEntry) -> InventoryTransaction {
        InventoryTransaction::record(TransactionId::new(id), entry, Utc::now())
    }

    #[test]
    fn fully_recorded_order_is_in_sync() {
        let order = order(&[(10, 2), (11, 1)]);
        let txs: Vec<_> = order
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| recorded(i as i64, ledger_entry(&order, item)))
            .collect();

        let report = ReconciliationReport::compare(&order, &txs);
        assert!(report.in_sync());
        assert_eq!(report.recorded_count, 2);
    }

    #[test]
    fn missing_movement_is_reported() {
        let order = order(&[(10, 2), (10, 2), (11, 1)]);
        let txs = vec![recorded(1, ledger_entry(&order, &order.items[0]))];

        let report = ReconciliationReport::compare(&order, &txs);
        assert!(!report.in_sync());
        let missing: Vec<i64> = report.unrecorded.iter().map(|u| u.order_item_id.get()).collect();
        assert_eq!(missing, vec![2, 3]);
    }

    #[test]
    fn inbound_movements_do_not_count() {
        let order = order(&[(10, 2)]);
        let mut entry = ledger_entry(&order, &order.items[0]);
        entry.transaction_type = TransactionType::In;

        let report = ReconciliationReport::compare(&order, &[recorded(1, entry)]);
        assert_eq!(report.unrecorded.len(), 1);
    }

    proptest! {
        #[test]
        fn dropping_one_movement_leaves_exactly_that_item_unrecorded(
            lines in prop::collection::vec((1i64..5, 1i64..4), 1..8),
            drop_seed in 0usize..64,
        ) {
            let order = order(&lines);
            let mut txs: Vec<_> = order
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| recorded(i as i64, ledger_entry(&order, item)))
                .collect();
            let dropped = drop_seed % txs.len();
            txs.remove(dropped);

            let report = ReconciliationReport::compare(&order, &txs);
            prop_assert_eq!(report.unrecorded.len(), 1);
            prop_assert_eq!(report.recorded_count, lines.len() - 1);
            let missing = &report.unrecorded[0];
            prop_assert_eq!(missing.product_id, order.items[dropped].product_id);
            prop_assert_eq!(missing.quantity, order.items[dropped].quantity);
        }
    }
}
