//! Order fulfillment workflow (application-level orchestration).
//!
//! ```text
//! NewOrder
//!   ↓
//! 1. Validate (shape + referenced customer, staff and products exist)
//!   ↓
//! 2. Persist order + items (one local transaction)
//!   ↓
//! 3. Fan out one `out` ledger entry per item, in item order, sequentially
//!   ↓
//! 4. Respond with the persisted order
//! ```
//!
//! Only steps 1 and 2 can fail the request. Once the order is committed it is
//! the caller's answer: a ledger call that fails in step 3 is logged with the
//! order id, product id and error, and is not retried or compensated. The
//! inventory side may therefore lag behind the order side; see
//! [`crate::reconciliation`] for detecting that.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use stockroom_core::ValidationErrors;
use stockroom_inventory::{LedgerEntry, MoneyType, TransactionType};
use stockroom_orders::{NewOrder, Order, OrderItem};

use crate::directory::{DirectoryError, ReferenceDirectory};
use crate::external::InventoryLedger;
use crate::order_store::{OrderStore, OrderStoreError};

#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Input rejected before anything was written.
    #[error("order validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The local commit failed; nothing is visible.
    #[error(transparent)]
    Store(OrderStoreError),
}

impl From<OrderStoreError> for FulfillmentError {
    fn from(value: OrderStoreError) -> Self {
        match value {
            OrderStoreError::DuplicateCode(code) => {
                let mut errors = ValidationErrors::new();
                errors.add("code", format!("order code '{code}' has already been taken"));
                FulfillmentError::Validation(errors)
            }
            other => FulfillmentError::Store(other),
        }
    }
}

/// Runs order creation against a store, a reference directory and the
/// inventory ledger.
#[derive(Debug)]
pub struct OrderFulfillment<S, D, L> {
    store: S,
    directory: D,
    ledger: L,
}

impl<S, D, L> OrderFulfillment<S, D, L> {
    pub fn new(store: S, directory: D, ledger: L) -> Self {
        Self {
            store,
            directory,
            ledger,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}

impl<S, D, L> OrderFulfillment<S, D, L>
where
    S: OrderStore,
    D: ReferenceDirectory,
    L: InventoryLedger,
{
    #[instrument(
        skip_all,
        fields(
            customer_id = %input.customer_id,
            staff_id = %input.staff_id,
            item_count = input.items.len()
        )
    )]
    pub async fn create_order(&self, input: NewOrder) -> Result<Order, FulfillmentError> {
        // 1) Validate (nothing written on failure)
        let errors = self.validate(&input).await?;
        if !errors.is_empty() {
            return Err(FulfillmentError::Validation(errors));
        }
        let draft = input
            .into_draft(Utc::now())
            .map_err(FulfillmentError::Validation)?;

        // 2) Persist order + items atomically
        let order = self.store.create(draft).await?;
        info!(order_id = %order.id, code = %order.code, total = %order.total_amount, "order persisted");

        // 3) Fan out to the inventory ledger (after commit, failures absorbed)
        self.record_stock_movements(&order).await;

        // 4) Respond
        Ok(order)
    }

    async fn validate(&self, input: &NewOrder) -> Result<ValidationErrors, FulfillmentError> {
        let mut errors = input.shape_errors();

        if !self.directory.customer_exists(input.customer_id).await? {
            errors.add("customer_id", "selected customer does not exist");
        }
        if !self.directory.staff_exists(input.staff_id).await? {
            errors.add("staff_id", "selected staff member does not exist");
        }
        for (idx, item) in input.items.iter().enumerate() {
            if !self.directory.product_exists(item.product_id).await? {
                errors.add(
                    format!("items.{idx}.product_id"),
                    "selected product does not exist",
                );
            }
        }

        Ok(errors)
    }

    async fn record_stock_movements(&self, order: &Order) {
        let mut failed = 0usize;
        for item in &order.items {
            let response = self.ledger.record(&ledger_entry(order, item)).await;
            if !response.success {
                failed += 1;
                warn!(
                    order_id = %order.id,
                    product_id = %item.product_id,
                    error = response.error.as_deref().unwrap_or("unknown error"),
                    "inventory ledger call failed; order kept"
                );
            }
        }

        if failed > 0 {
            warn!(order_id = %order.id, failed, total = order.items.len(), "inventory ledger out of sync with order");
        }
    }
}

/// The `out`/`income` movement recorded for one sold line.
pub fn ledger_entry(order: &Order, item: &OrderItem) -> LedgerEntry {
    LedgerEntry {
        transaction_type: TransactionType::Out,
        product_id: item.product_id,
        quantity: item.quantity,
        staff_id: order.staff_id,
        order_id: Some(order.id),
        supplier_id: None,
        amount: Some(item.amount()),
        money_type: Some(MoneyType::Income),
        notes: Some(format!("Sale for order {}", order.code)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::json;
    use stockroom_core::{CustomerId, OrderId, ProductId, StaffId};
    use stockroom_inventory::{InventoryTransaction, LedgerResponse};
    use stockroom_orders::NewOrderItem;

    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::external::LedgerClientError;
    use crate::order_store::InMemoryOrderStore;

    /// Records every call along with how many orders were committed when it ran.
    struct RecordingLedger {
        store: Arc<InMemoryOrderStore>,
        fail_for: Option<ProductId>,
        calls: Mutex<Vec<(LedgerEntry, usize)>>,
    }

    impl RecordingLedger {
        fn new(store: Arc<InMemoryOrderStore>) -> Self {
            Self {
                store,
                fail_for: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(LedgerEntry, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InventoryLedger for RecordingLedger {
        async fn record(&self, entry: &LedgerEntry) -> LedgerResponse {
            self.calls
                .lock()
                .unwrap()
                .push((entry.clone(), self.store.len()));
            if self.fail_for == Some(entry.product_id) {
                LedgerResponse::failure("connection reset")
            } else {
                LedgerResponse::ok(json!({ "id": 1 }))
            }
        }

        async fn list_for_order(
            &self,
            _order_id: OrderId,
        ) -> Result<Vec<InventoryTransaction>, LedgerClientError> {
            Ok(vec![])
        }
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_customer(CustomerId::new(7))
            .with_staff(StaffId::new(3))
            .with_product(ProductId::new(10))
            .with_product(ProductId::new(11))
            .with_product(ProductId::new(12))
    }

    fn item(product: i64, quantity: i64, cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: ProductId::new(product),
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    fn new_order(customer: i64, items: Vec<NewOrderItem>) -> NewOrder {
        NewOrder {
            customer_id: CustomerId::new(customer),
            staff_id: StaffId::new(3),
            items,
            code: None,
            order_date: None,
            status: None,
        }
    }

    fn setup(
        fail_for: Option<ProductId>,
    ) -> (
        Arc<InMemoryOrderStore>,
        Arc<RecordingLedger>,
        OrderFulfillment<Arc<InMemoryOrderStore>, InMemoryDirectory, Arc<RecordingLedger>>,
    ) {
        let store = Arc::new(InMemoryOrderStore::new());
        let mut ledger = RecordingLedger::new(store.clone());
        ledger.fail_for = fail_for;
        let ledger = Arc::new(ledger);
        let workflow = OrderFulfillment::new(store.clone(), directory(), ledger.clone());
        (store, ledger, workflow)
    }

    #[tokio::test]
    async fn single_item_order_records_one_out_movement() {
        let (_store, ledger, workflow) = setup(None);

        let order = workflow
            .create_order(new_order(7, vec![item(10, 2, 1500)]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, Decimal::new(3000, 2));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].subtotal, Decimal::new(3000, 2));

        let calls = ledger.calls();
        assert_eq!(calls.len(), 1);
        let (entry, _) = &calls[0];
        assert_eq!(entry.transaction_type, TransactionType::Out);
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.amount, Some(Decimal::new(3000, 2)));
        assert_eq!(entry.money_type, Some(MoneyType::Income));
        assert_eq!(entry.staff_id, StaffId::new(3));
        assert_eq!(entry.order_id, Some(order.id));
    }

    #[tokio::test]
    async fn one_call_per_item_in_item_order_after_commit() {
        let (_store, ledger, workflow) = setup(None);

        workflow
            .create_order(new_order(
                7,
                vec![item(12, 1, 100), item(10, 3, 250), item(11, 2, 0)],
            ))
            .await
            .unwrap();

        let calls = ledger.calls();
        let products: Vec<i64> = calls.iter().map(|(e, _)| e.product_id.get()).collect();
        assert_eq!(products, vec![12, 10, 11]);
        assert!(calls.iter().all(|(_, committed)| *committed == 1));
    }

    #[tokio::test]
    async fn failed_ledger_call_does_not_fail_the_order() {
        let (store, ledger, workflow) = setup(Some(ProductId::new(10)));

        let order = workflow
            .create_order(new_order(7, vec![item(10, 1, 500), item(11, 1, 700)]))
            .await
            .unwrap();

        assert_eq!(ledger.calls().len(), 2);
        let stored = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn unknown_customer_writes_nothing_and_calls_nothing() {
        let (store, ledger, workflow) = setup(None);

        let err = workflow
            .create_order(new_order(999, vec![item(10, 1, 500)]))
            .await
            .unwrap_err();

        match err {
            FulfillmentError::Validation(errors) => assert!(errors.contains("customer_id")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.is_empty());
        assert!(ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn every_invalid_field_is_reported() {
        let (store, _ledger, workflow) = setup(None);

        let err = workflow
            .create_order(new_order(7, vec![item(10, 0, 500), item(404, 1, -1)]))
            .await
            .unwrap_err();

        let FulfillmentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("items.0.quantity"));
        assert!(errors.contains("items.1.product_id"));
        assert!(errors.contains("items.1.unit_price"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn duplicate_code_is_a_validation_error() {
        let (_store, ledger, workflow) = setup(None);
        let mut first = new_order(7, vec![item(10, 1, 500)]);
        first.code = Some("ORD-FIXED".to_string());
        workflow.create_order(first.clone()).await.unwrap();

        let err = workflow.create_order(first).await.unwrap_err();
        let FulfillmentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("code"));
        assert_eq!(ledger.calls().len(), 1);
    }

    #[tokio::test]
    async fn huge_quantity_and_price_are_rejected_without_side_effects() {
        let (store, ledger, workflow) = setup(None);

        let mut input = new_order(7, vec![item(10, i64::MAX, 0)]);
        input.items[0].unit_price = Decimal::new(10_000_000_000, 0);

        let err = workflow.create_order(input).await.unwrap_err();
        let FulfillmentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("items.0.quantity"));
        assert!(store.is_empty());
        assert!(ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn line_amount_beyond_storage_range_is_a_validation_error() {
        let (store, ledger, workflow) = setup(None);

        // both fields in range, product too large to store
        let input = new_order(7, vec![item(10, 1_000_000, 99_999_999_999_999)]);

        let err = workflow.create_order(input).await.unwrap_err();
        let FulfillmentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("items.0"));
        assert!(store.is_empty());
        assert!(ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn over_scaled_price_is_rejected_so_the_stored_order_matches_the_response() {
        let (store, _ledger, workflow) = setup(None);

        let mut input = new_order(7, vec![item(10, 2, 0)]);
        input.items[0].unit_price = Decimal::new(1005, 3);

        let err = workflow.create_order(input).await.unwrap_err();
        let FulfillmentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("items.0.unit_price"));
        assert!(store.is_empty());
    }
}
