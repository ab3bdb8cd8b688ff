//! Extension trait for U256 arithmetic operations.

use {
    crate::math::{self, MathError},
    alloy_primitives::U256,
};

/// Extension trait for U256 to add utility methods.
pub trait U256Ext: Sized {
    /// Basis point share of this amount, rounding down.
    fn bps(&self, bps: u64) -> Result<Self, MathError>;

    /// Deducts up to `amount` from `self` and returns how much was actually
    /// deducted. Never underflows: when `amount` exceeds `self`, `self`
    /// becomes zero and the deduction is capped.
    fn deduct_capped(&mut self, amount: Self) -> Self;
}

impl U256Ext for U256 {
    fn bps(&self, bps: u64) -> Result<Self, MathError> {
        math::bps(*self, bps)
    }

    fn deduct_capped(&mut self, amount: Self) -> Self {
        let deducted = amount.min(*self);
        *self -= deducted;
        deducted
    }
}
