//! Reference data lookups needed before an order is accepted.
//!
//! Customers and staff are owned by the users service, products by the
//! inventory service; the order service only asks whether an id exists.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{CustomerId, ProductId, StaffId};

pub use in_memory::{DirectorySeed, InMemoryDirectory};
pub use postgres::PostgresDirectory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("reference directory unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, DirectoryError>;
    async fn staff_exists(&self, id: StaffId) -> Result<bool, DirectoryError>;
    async fn product_exists(&self, id: ProductId) -> Result<bool, DirectoryError>;
}

#[async_trait]
impl<D> ReferenceDirectory for Arc<D>
where
    D: ReferenceDirectory + ?Sized,
{
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, DirectoryError> {
        (**self).customer_exists(id).await
    }

    async fn staff_exists(&self, id: StaffId) -> Result<bool, DirectoryError> {
        (**self).staff_exists(id).await
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, DirectoryError> {
        (**self).product_exists(id).await
    }
}
