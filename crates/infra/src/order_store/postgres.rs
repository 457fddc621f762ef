//! Postgres-backed order store.
//!
//! `create` runs in a single transaction: insert the order row, insert every
//! item row, commit. Any failure rolls the whole order back.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | OrderStoreError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation on `orders.code`) | `23505` | `DuplicateCode` |
//! | Anything else | N/A | `Backend` |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use stockroom_core::{CustomerId, Money, OrderId, OrderItemId, ProductId, StaffId};
use stockroom_orders::{Order, OrderCode, OrderDraft, OrderItem, OrderStatus};

use super::r#trait::{OrderStore, OrderStoreError};

#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `orders` and `order_items` tables when missing.
    pub async fn ensure_schema(&self) -> Result<(), OrderStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id           BIGSERIAL PRIMARY KEY,
                code         TEXT NOT NULL UNIQUE,
                customer_id  BIGINT NOT NULL,
                staff_id     BIGINT NOT NULL,
                total_amount NUMERIC(14, 2) NOT NULL,
                status       TEXT NOT NULL,
                order_date   TIMESTAMPTZ NOT NULL,
                created_at   TIMESTAMPTZ NOT NULL,
                updated_at   TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_orders_table", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS order_items (
                id         BIGSERIAL PRIMARY KEY,
                order_id   BIGINT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
                product_id BIGINT NOT NULL,
                quantity   BIGINT NOT NULL CHECK (quantity >= 1),
                unit_price NUMERIC(14, 2) NOT NULL CHECK (unit_price >= 0),
                subtotal   NUMERIC(14, 2) NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_order_items_table", e))?;

        Ok(())
    }

    async fn load_items(
        &self,
        order_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<OrderItem>>, OrderStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_items", e))?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id: i64 = row.try_get("order_id").map_err(row_error)?;
            let item = OrderItem {
                id: OrderItemId::new(row.try_get("id").map_err(row_error)?),
                order_id: OrderId::new(order_id),
                product_id: ProductId::new(row.try_get("product_id").map_err(row_error)?),
                quantity: row.try_get("quantity").map_err(row_error)?,
                unit_price: row.try_get::<Money, _>("unit_price").map_err(row_error)?,
                subtotal: row.try_get::<Money, _>("subtotal").map_err(row_error)?,
            };
            by_order.entry(order_id).or_default().push(item);
        }
        Ok(by_order)
    }

    async fn load_orders(
        &self,
        rows: Vec<sqlx::postgres::PgRow>,
    ) -> Result<Vec<Order>, OrderStoreError> {
        let mut heads = Vec::with_capacity(rows.len());
        for row in &rows {
            heads.push(OrderRow::from_row(row)?);
        }

        let ids: Vec<i64> = heads.iter().map(|h| h.id).collect();
        let mut items = self.load_items(&ids).await?;

        Ok(heads
            .into_iter()
            .map(|head| {
                let order_items = items.remove(&head.id).unwrap_or_default();
                head.into_order(order_items)
            })
            .collect())
    }
}

const ORDER_COLUMNS: &str =
    "id, code, customer_id, staff_id, total_amount, status, order_date, created_at, updated_at";

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, draft), fields(code = %draft.code, item_count = draft.items.len()), err)]
    async fn create(&self, draft: OrderDraft) -> Result<Order, OrderStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                code, customer_id, staff_id, total_amount, status,
                order_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id
            "#,
        )
        .bind(draft.code.as_str())
        .bind(draft.customer_id.get())
        .bind(draft.staff_id.get())
        .bind(draft.total_amount)
        .bind(draft.status.as_str())
        .bind(draft.order_date)
        .bind(draft.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                OrderStoreError::DuplicateCode(draft.code.to_string())
            } else {
                map_sqlx_error("insert_order", e)
            }
        })?;

        let mut item_ids = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            let item_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(order_id)
            .bind(item.product_id.get())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_item", e))?;
            item_ids.push(OrderItemId::new(item_id));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(Order::from_draft(OrderId::new(order_id), draft, &item_ids))
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_order", e))?;

        match row {
            Some(row) => Ok(self.load_orders(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Order>, OrderStoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        self.load_orders(rows).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        let updated = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_status", e))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

struct OrderRow {
    id: i64,
    code: String,
    customer_id: i64,
    staff_id: i64,
    total_amount: Money,
    status: String,
    order_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, OrderStoreError> {
        Ok(Self {
            id: row.try_get("id").map_err(row_error)?,
            code: row.try_get("code").map_err(row_error)?,
            customer_id: row.try_get("customer_id").map_err(row_error)?,
            staff_id: row.try_get("staff_id").map_err(row_error)?,
            total_amount: row.try_get("total_amount").map_err(row_error)?,
            status: row.try_get("status").map_err(row_error)?,
            order_date: row.try_get("order_date").map_err(row_error)?,
            created_at: row.try_get("created_at").map_err(row_error)?,
            updated_at: row.try_get("updated_at").map_err(row_error)?,
        })
    }

    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            code: OrderCode::new(self.code),
            customer_id: CustomerId::new(self.customer_id),
            staff_id: StaffId::new(self.staff_id),
            total_amount: self.total_amount,
            // Only this store writes the column, always from `OrderStatus::as_str`.
            status: self.status.parse().unwrap_or_default(),
            order_date: self.order_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

fn row_error(err: sqlx::Error) -> OrderStoreError {
    OrderStoreError::Backend(format!("failed to decode order row: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> OrderStoreError {
    match err {
        sqlx::Error::Database(db_err) => OrderStoreError::Backend(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            OrderStoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => OrderStoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}
