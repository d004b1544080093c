use anchor_lang::prelude::error_code;

#[error_code]
pub enum ErrorCode {
    #[msg("Pool is already initialized")]
    PoolAlreadyInitialized,
    #[msg("Transfer failed")]
    TransferFailed,
    #[msg("Initial amounts are below the pool minimums")]
    InvalidRatio,
    #[msg("Liquidity amount must be greater than zero")]
    InvalidLiquidityAmount,
    #[msg("Unsupported token kind")]
    UnsupportedTokenKind,
    #[msg("Insufficient base currency provided")]
    InsufficientBaseProvided,
    #[msg("Insufficient tokens provided")]
    InsufficientTokenProvided,
    #[msg("Pool is not initialized")]
    PoolNotInitialized,
    #[msg("Not enough liquidity")]
    NotEnoughLiquidity,
    #[msg("Swap amount must be greater than zero")]
    InvalidSwapValue,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Math underflow")]
    MathUnderflow,
}
