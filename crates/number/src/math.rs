use {
    alloy_primitives::{U256, U512},
    thiserror::Error,
};

/// Denominator of every basis point value: `10_000` bps is 100%.
pub const BASIS_POINTS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("rounding error exceeds 0.1% of the result")]
    RoundingError,
}

/// Computes `x * q / d` rounding down.
///
/// Returns `None` if `d` is `0` or if the result overflows a 256-bit integer.
pub fn mul_ratio(x: U256, q: U256, d: U256) -> Option<U256> {
    if d.is_zero() {
        return None;
    }

    // fast path when math in U256 doesn't overflow
    if let Some(res) = x.checked_mul(q) {
        return Some(res / d);
    }

    let div = (U512::from(x) * U512::from(q)) / U512::from(d);
    narrow(div)
}

/// Computes `numerator * target / denominator` rounding down.
pub fn partial_amount_floor(
    numerator: U256,
    denominator: U256,
    target: U256,
) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    mul_ratio(numerator, target, denominator).ok_or(MathError::Overflow)
}

/// Like [`partial_amount_floor`] but rejects results whose truncated remainder
/// is 0.1% or more of the exact value.
pub fn safe_partial_amount_floor(
    numerator: U256,
    denominator: U256,
    target: U256,
) -> Result<U256, MathError> {
    if is_rounding_error_floor(numerator, denominator, target)? {
        return Err(MathError::RoundingError);
    }
    partial_amount_floor(numerator, denominator, target)
}

/// Checks whether flooring `numerator * target / denominator` loses 0.1% or
/// more of the exact result.
pub fn is_rounding_error_floor(
    numerator: U256,
    denominator: U256,
    target: U256,
) -> Result<bool, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if target.is_zero() || numerator.is_zero() {
        return Ok(false);
    }
    let product = U512::from(target) * U512::from(numerator);
    let remainder = product % U512::from(denominator);
    Ok(remainder * U512::from(1000u64) >= product)
}

/// Computes `amount * bps / 10_000` rounding down.
pub fn bps(amount: U256, bps: u64) -> Result<U256, MathError> {
    mul_ratio(amount, U256::from(bps), U256::from(BASIS_POINTS)).ok_or(MathError::Overflow)
}

fn narrow(value: U512) -> Option<U256> {
    let limbs = value.into_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs_slice(&limbs[..4]))
}
