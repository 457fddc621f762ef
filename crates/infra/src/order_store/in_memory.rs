use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{OrderId, OrderItemId};
use stockroom_orders::{Order, OrderDraft, OrderStatus};

use super::r#trait::{OrderStore, OrderStoreError};

#[derive(Debug, Default)]
struct Tables {
    orders: BTreeMap<OrderId, Order>,
    next_order_id: i64,
    next_item_id: i64,
}

/// In-memory order store for tests/dev.
///
/// Ids are assigned from 1 upwards, like auto-increment columns.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<Tables>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> OrderStoreError {
    OrderStoreError::Backend("order store lock poisoned".to_string())
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order, OrderStoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;

        if tables.orders.values().any(|o| o.code == draft.code) {
            return Err(OrderStoreError::DuplicateCode(draft.code.to_string()));
        }

        tables.next_order_id += 1;
        let order_id = OrderId::new(tables.next_order_id);

        let item_ids: Vec<OrderItemId> = draft
            .items
            .iter()
            .map(|_| {
                tables.next_item_id += 1;
                OrderItemId::new(tables.next_item_id)
            })
            .collect();

        let order = Order::from_draft(order_id, draft, &item_ids);
        tables.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.orders.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, OrderStoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let Some(order) = tables.orders.get_mut(&id) else {
            return Ok(None);
        };
        order.status = status;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}
