/// Swap fee applied to the input amount: 997 / 1000, i.e. 0.3%
pub const FEE_NUMERATOR: u128 = 997;
pub const FEE_DENOMINATOR: u128 = 1000;

/// Decimals reported by the token ledger
pub const TOKEN_DECIMALS: u8 = 18;

/// Smallest base amount accepted by `initialize` (0.001 unit)
pub const MIN_BASE: u128 = 1_000_000_000_000_000;
/// Smallest token amount accepted by `initialize` (1 token)
pub const MIN_TOKEN: u128 = 1_000_000_000_000_000_000;
