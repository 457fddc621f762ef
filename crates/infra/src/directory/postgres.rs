//! Postgres-backed directory.
//!
//! Reads the `customers`, `staff` and `products` tables of a shared reference
//! database. Only existence is queried.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use stockroom_core::{CustomerId, ProductId, StaffId};

use super::{DirectoryError, ReferenceDirectory};

#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn exists(&self, table: &'static str, id: i64) -> Result<bool, DirectoryError> {
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)"
        ))
        .bind(id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DirectoryError::Unavailable(format!("lookup in {table} failed: {e}")))
    }
}

#[async_trait]
impl ReferenceDirectory for PostgresDirectory {
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, DirectoryError> {
        self.exists("customers", id.get()).await
    }

    async fn staff_exists(&self, id: StaffId) -> Result<bool, DirectoryError> {
        self.exists("staff", id.get()).await
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, DirectoryError> {
        self.exists("products", id.get()).await
    }
}
