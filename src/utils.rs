use spl_math::uint::U256;

/// Narrow a 256-bit intermediate back into `u128`, `None` if it does not fit
pub fn to_u128(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        return None;
    }
    Some(value.as_u128())
}

/// `floor(amount * numerator / denominator)` with a 256-bit intermediate.
///
/// Returns `None` when `denominator` is zero or the quotient exceeds `u128`.
pub fn floor_div(amount: u128, numerator: u128, denominator: u128) -> Option<u128> {
    let product = U256::from(amount).checked_mul(U256::from(numerator))?;
    to_u128(product.checked_div(U256::from(denominator))?)
}
