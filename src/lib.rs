//! Constant-product pool engine
//!
//! A two-asset pool exchanging the host's base currency for a fungible
//! token. Shares are tracked here; reserves are always read live from the
//! runtime's balances.

pub mod constants;
pub mod errors;
pub mod events;
pub mod liquidity;
pub mod pool;
pub mod runtime;
pub mod state;
pub mod swap;
pub mod utils;

// Re-export functions for convenience
pub use constants::*;
pub use errors::ErrorCode;
pub use events::{LiquidityAdded, LiquidityRemoved, PoolEvent, Swap};
pub use liquidity::{deposit_lp, quote, quote_tagged, withdraw_lp};
pub use runtime::{MemoryRuntime, NativeCurrency, Runtime, TokenLedger};
pub use state::{Pool, PoolConfig, PoolState, Reserves, SwapDirection, TokenKind};
pub use swap::get_amount_out;
