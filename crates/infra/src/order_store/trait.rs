use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::OrderId;
use stockroom_orders::{Order, OrderDraft, OrderStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderStoreError {
    /// Another order already uses this code.
    #[error("order code already exists: {0}")]
    DuplicateCode(String),

    #[error("order store failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order and all of its items in one unit of work.
    async fn create(&self, draft: OrderDraft) -> Result<Order, OrderStoreError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>, OrderStoreError>;

    /// Change the status only. Returns `None` when the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn create(&self, draft: OrderDraft) -> Result<Order, OrderStoreError> {
        (**self).create(draft).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, OrderStoreError> {
        (**self).list().await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        (**self).update_status(id, status).await
    }
}
