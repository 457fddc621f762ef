use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use stockroom_core::ProductId;

use crate::InventoryTransaction;

/// Stock on hand per product, as produced by the recorded transactions.
///
/// Levels may go negative: orders never check availability before the
/// ledger records their `out` movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockLevels {
    levels: BTreeMap<ProductId, i64>,
}

/// Applying a movement would take a stock level past the `i64` range.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("stock level of product {product_id} would overflow")]
pub struct StockOverflow {
    pub product_id: ProductId,
}

impl StockLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// The level `transaction` would leave its product at, without applying it.
    pub fn level_after(&self, transaction: &InventoryTransaction) -> Result<i64, StockOverflow> {
        let overflow = StockOverflow {
            product_id: transaction.product_id,
        };
        let delta = transaction.stock_delta().ok_or(overflow)?;
        self.on_hand(transaction.product_id)
            .checked_add(delta)
            .ok_or(overflow)
    }

    /// Apply `transaction` and return the new level. Nothing changes on error.
    pub fn apply(&mut self, transaction: &InventoryTransaction) -> Result<i64, StockOverflow> {
        let level = self.level_after(transaction)?;
        self.levels.insert(transaction.product_id, level);
        Ok(level)
    }

    pub fn on_hand(&self, product_id: ProductId) -> i64 {
        self.levels.get(&product_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use stockroom_core::{StaffId, TransactionId};

    use super::*;
    use crate::{LedgerEntry, TransactionType};

    fn tx(id: i64, transaction_type: TransactionType, quantity: i64) -> InventoryTransaction {
        InventoryTransaction::record(
            TransactionId::new(id),
            LedgerEntry {
                transaction_type,
                product_id: ProductId::new(10),
                quantity,
                staff_id: StaffId::new(1),
                order_id: None,
                supplier_id: None,
                amount: None,
                money_type: None,
                notes: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn unknown_product_has_nothing_on_hand() {
        assert_eq!(StockLevels::new().on_hand(ProductId::new(99)), 0);
    }

    #[test]
    fn out_without_stock_goes_negative() {
        let mut levels = StockLevels::new();
        levels.apply(&tx(1, TransactionType::Out, 3)).unwrap();
        assert_eq!(levels.on_hand(ProductId::new(10)), -3);
    }

    #[test]
    fn overflow_is_reported_and_leaves_the_level_unchanged() {
        let mut levels = StockLevels::new();
        levels.apply(&tx(1, TransactionType::In, i64::MAX)).unwrap();

        let err = levels.apply(&tx(2, TransactionType::In, 1)).unwrap_err();
        assert_eq!(err.product_id, ProductId::new(10));
        assert_eq!(levels.on_hand(ProductId::new(10)), i64::MAX);

        assert_eq!(levels.apply(&tx(3, TransactionType::Out, 1)), Ok(i64::MAX - 1));
    }

    #[test]
    fn underflow_is_reported() {
        let mut levels = StockLevels::new();
        levels.apply(&tx(1, TransactionType::Out, i64::MAX)).unwrap();
        assert!(levels.apply(&tx(2, TransactionType::Out, 2)).is_err());
        assert_eq!(levels.on_hand(ProductId::new(10)), -i64::MAX);
    }

    proptest! {
        #[test]
        fn level_is_ins_minus_outs(moves in prop::collection::vec((any::<bool>(), 1i64..500), 0..50)) {
            let mut levels = StockLevels::new();
            let mut expected = 0i64;
            for (idx, (is_in, qty)) in moves.iter().enumerate() {
                let kind = if *is_in { TransactionType::In } else { TransactionType::Out };
                levels.apply(&tx(idx as i64, kind, *qty)).unwrap();
                expected += if *is_in { *qty } else { -*qty };
            }
            prop_assert_eq!(levels.on_hand(ProductId::new(10)), expected);
        }
    }
}
