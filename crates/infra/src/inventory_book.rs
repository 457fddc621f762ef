//! Storage for the inventory service: catalog, ledger transactions, stock.
//!
//! The ledger is append-only. Stock levels are derived from it as each
//! transaction is recorded.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{CategoryId, OrderId, ProductId, TransactionId};
use stockroom_inventory::{
    Category, InventoryTransaction, LedgerEntry, NewCategory, NewProduct, Product, StockLevels,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryBookError {
    #[error("category {0} does not exist")]
    UnknownCategory(CategoryId),

    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    /// The movement would push the product's stock level out of range.
    #[error("stock level of product {0} would overflow")]
    StockOverflow(ProductId),

    #[error("inventory storage failure: {0}")]
    Backend(String),
}

pub trait InventoryBook: Send + Sync {
    fn create_category(&self, input: NewCategory) -> Result<Category, InventoryBookError>;
    fn list_categories(&self) -> Result<Vec<Category>, InventoryBookError>;

    fn create_product(&self, input: NewProduct) -> Result<Product, InventoryBookError>;
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, InventoryBookError>;
    fn list_products(&self) -> Result<Vec<Product>, InventoryBookError>;

    /// Append one transaction and apply its stock movement.
    fn record(&self, entry: LedgerEntry) -> Result<InventoryTransaction, InventoryBookError>;

    /// Transactions in recording order, optionally filtered by correlation id.
    fn transactions(
        &self,
        order_id: Option<OrderId>,
    ) -> Result<Vec<InventoryTransaction>, InventoryBookError>;

    /// `None` when the product is not in the catalog.
    fn on_hand(&self, product_id: ProductId) -> Result<Option<i64>, InventoryBookError>;
}

impl<B> InventoryBook for Arc<B>
where
    B: InventoryBook + ?Sized,
{
    fn create_category(&self, input: NewCategory) -> Result<Category, InventoryBookError> {
        (**self).create_category(input)
    }

    fn list_categories(&self) -> Result<Vec<Category>, InventoryBookError> {
        (**self).list_categories()
    }

    fn create_product(&self, input: NewProduct) -> Result<Product, InventoryBookError> {
        (**self).create_product(input)
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, InventoryBookError> {
        (**self).get_product(id)
    }

    fn list_products(&self) -> Result<Vec<Product>, InventoryBookError> {
        (**self).list_products()
    }

    fn record(&self, entry: LedgerEntry) -> Result<InventoryTransaction, InventoryBookError> {
        (**self).record(entry)
    }

    fn transactions(
        &self,
        order_id: Option<OrderId>,
    ) -> Result<Vec<InventoryTransaction>, InventoryBookError> {
        (**self).transactions(order_id)
    }

    fn on_hand(&self, product_id: ProductId) -> Result<Option<i64>, InventoryBookError> {
        (**self).on_hand(product_id)
    }
}

#[derive(Debug, Default)]
struct Book {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    transactions: Vec<InventoryTransaction>,
    stock: StockLevels,
}

/// In-memory inventory book for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryBook {
    inner: RwLock<Book>,
}

impl InMemoryInventoryBook {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> InventoryBookError {
    InventoryBookError::Backend("inventory book lock poisoned".to_string())
}

impl InventoryBook for InMemoryInventoryBook {
    fn create_category(&self, input: NewCategory) -> Result<Category, InventoryBookError> {
        let mut book = self.inner.write().map_err(|_| poisoned())?;
        let id = CategoryId::new(book.categories.len() as i64 + 1);
        let category = Category {
            id,
            name: input.name.trim().to_string(),
            description: input.description,
            created_at: Utc::now(),
        };
        book.categories.insert(id, category.clone());
        Ok(category)
    }

    fn list_categories(&self) -> Result<Vec<Category>, InventoryBookError> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        Ok(book.categories.values().cloned().collect())
    }

    fn create_product(&self, input: NewProduct) -> Result<Product, InventoryBookError> {
        let mut book = self.inner.write().map_err(|_| poisoned())?;
        if !book.categories.contains_key(&input.category_id) {
            return Err(InventoryBookError::UnknownCategory(input.category_id));
        }

        let id = ProductId::new(book.products.len() as i64 + 1);
        let product = Product {
            id,
            name: input.name.trim().to_string(),
            category_id: input.category_id,
            price: input.price,
            sku: input.sku,
            created_at: Utc::now(),
        };
        book.products.insert(id, product.clone());
        Ok(product)
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, InventoryBookError> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        Ok(book.products.get(&id).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, InventoryBookError> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        Ok(book.products.values().cloned().collect())
    }

    fn record(&self, entry: LedgerEntry) -> Result<InventoryTransaction, InventoryBookError> {
        let mut book = self.inner.write().map_err(|_| poisoned())?;
        if !book.products.contains_key(&entry.product_id) {
            return Err(InventoryBookError::UnknownProduct(entry.product_id));
        }

        let id = TransactionId::new(book.transactions.len() as i64 + 1);
        let transaction = InventoryTransaction::record(id, entry, Utc::now());
        // Stock first: on overflow neither the level nor the ledger changes.
        book.stock
            .apply(&transaction)
            .map_err(|e| InventoryBookError::StockOverflow(e.product_id))?;
        book.transactions.push(transaction.clone());
        Ok(transaction)
    }

    fn transactions(
        &self,
        order_id: Option<OrderId>,
    ) -> Result<Vec<InventoryTransaction>, InventoryBookError> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        Ok(book
            .transactions
            .iter()
            .filter(|tx| order_id.is_none() || tx.order_id == order_id)
            .cloned()
            .collect())
    }

    fn on_hand(&self, product_id: ProductId) -> Result<Option<i64>, InventoryBookError> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        if !book.products.contains_key(&product_id) {
            return Ok(None);
        }
        Ok(Some(book.stock.on_hand(product_id)))
    }
}
