// src/utils/precision.rs
use rust_decimal::Decimal;

/// Rounds a quantity DOWN to the nearest multiple of `step_size`.
/// Example: amount=10.999, step=1.0 -> 10.0
pub fn normalize_quantity(amount: Decimal, step_size: Decimal) -> Decimal {
    if step_size.is_zero() {
        return amount;
    }
    (amount / step_size).floor() * step_size
}
