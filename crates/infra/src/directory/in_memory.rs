use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;

use stockroom_core::{CustomerId, ProductId, StaffId};

use super::{DirectoryError, ReferenceDirectory};

/// Known ids, as loaded from a seed file.
///
/// ```json
/// { "customers": [7], "staff": [3], "products": [10, 11] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub customers: Vec<CustomerId>,
    #[serde(default)]
    pub staff: Vec<StaffId>,
    #[serde(default)]
    pub products: Vec<ProductId>,
}

#[derive(Debug, Default)]
struct Known {
    customers: BTreeSet<CustomerId>,
    staff: BTreeSet<StaffId>,
    products: BTreeSet<ProductId>,
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Known>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            inner: RwLock::new(Known {
                customers: seed.customers.into_iter().collect(),
                staff: seed.staff.into_iter().collect(),
                products: seed.products.into_iter().collect(),
            }),
        }
    }

    pub fn with_customer(self, id: CustomerId) -> Self {
        if let Ok(mut known) = self.inner.write() {
            known.customers.insert(id);
        }
        self
    }

    pub fn with_staff(self, id: StaffId) -> Self {
        if let Ok(mut known) = self.inner.write() {
            known.staff.insert(id);
        }
        self
    }

    pub fn with_product(self, id: ProductId) -> Self {
        if let Ok(mut known) = self.inner.write() {
            known.products.insert(id);
        }
        self
    }

    fn read<T>(&self, f: impl FnOnce(&Known) -> T) -> Result<T, DirectoryError> {
        let known = self
            .inner
            .read()
            .map_err(|_| DirectoryError::Unavailable("directory lock poisoned".to_string()))?;
        Ok(f(&known))
    }
}

#[async_trait]
impl ReferenceDirectory for InMemoryDirectory {
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, DirectoryError> {
        self.read(|k| k.customers.contains(&id))
    }

    async fn staff_exists(&self, id: StaffId) -> Result<bool, DirectoryError> {
        self.read(|k| k.staff.contains(&id))
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, DirectoryError> {
        self.read(|k| k.products.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_ids_exist_and_others_do_not() {
        let seed: DirectorySeed =
            serde_json::from_str(r#"{ "customers": [7], "products": [10, 11] }"#).unwrap();
        let directory = InMemoryDirectory::from_seed(seed).with_staff(StaffId::new(3));

        assert!(directory.customer_exists(CustomerId::new(7)).await.unwrap());
        assert!(!directory.customer_exists(CustomerId::new(8)).await.unwrap());
        assert!(directory.staff_exists(StaffId::new(3)).await.unwrap());
        assert!(directory.product_exists(ProductId::new(11)).await.unwrap());
        assert!(!directory.product_exists(ProductId::new(12)).await.unwrap());
    }
}
