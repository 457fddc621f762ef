use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, Money, ProductId, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category_id: CategoryId,
    pub price: Money,
    #[serde(default)]
    pub sku: Option<String>,
}

impl NewProduct {
    pub fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        }
        if self.price < Money::ZERO {
            errors.add("price", "must not be negative");
        }
        errors
    }
}

/// Catalog entry. Stock on hand is tracked separately, per product id, from
/// ledger transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub price: Money,
    pub sku: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn blank_name_and_negative_price_are_rejected() {
        let product = NewProduct {
            name: "  ".to_string(),
            category_id: CategoryId::new(1),
            price: Decimal::new(-100, 2),
            sku: None,
        };
        let errors = product.field_errors();
        assert!(errors.contains("name"));
        assert!(errors.contains("price"));
    }

    #[test]
    fn price_accepts_numbers_and_strings() {
        let from_number: NewProduct =
            serde_json::from_str(r#"{"name":"Tea","category_id":1,"price":4.5}"#).unwrap();
        let from_string: NewProduct =
            serde_json::from_str(r#"{"name":"Tea","category_id":1,"price":"4.50"}"#).unwrap();
        assert_eq!(from_number.price, from_string.price);
        assert!(from_number.field_errors().is_empty());
    }
}
