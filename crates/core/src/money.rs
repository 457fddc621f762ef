//! Monetary amounts.
//!
//! Amounts are exact decimals (`rust_decimal`), never floats. On the wire they
//! serialize as strings (`"30.00"`) and deserialize from either strings or
//! JSON numbers.
//!
//! Stored amounts are `NUMERIC(14, 2)`: at most two decimal places and an
//! absolute value no larger than [`max_amount`]. Arithmetic on amounts is
//! checked; an overflow is reported, never panics.

use rust_decimal::Decimal;

pub type Money = Decimal;

/// Decimal places kept for stored amounts.
pub const MONEY_SCALE: u32 = 2;

/// Largest quantity accepted on an order line or a ledger movement.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest amount a `NUMERIC(14, 2)` column holds (`999999999999.99`).
pub fn max_amount() -> Money {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// `true` when `amount` is storable without rounding or overflow.
pub fn is_storable(amount: Money) -> bool {
    amount.normalize().scale() <= MONEY_SCALE && amount.abs() <= max_amount()
}

/// `amount` written with exactly [`MONEY_SCALE`] places, as a `NUMERIC(14, 2)`
/// column returns it. Rounds half away from zero when `amount` has more.
pub fn to_money_scale(amount: Money) -> Money {
    let mut scaled = amount;
    scaled.rescale(MONEY_SCALE);
    scaled
}

/// `unit_price × quantity`, the amount of one order line. `None` on overflow.
pub fn line_amount(unit_price: Money, quantity: i64) -> Option<Money> {
    unit_price.checked_mul(Decimal::from(quantity))
}

/// Sum of `amounts`. `None` on overflow.
pub fn checked_total(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
    amounts
        .into_iter()
        .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
}
