use anchor_lang::prelude::*;
use spl_math::uint::U256;

use crate::{
    events::Swap,
    runtime::Runtime,
    state::{Pool, SwapDirection},
    utils::to_u128,
    ErrorCode, FEE_DENOMINATOR, FEE_NUMERATOR,
};

/// Calculate the output amount of a swap
///
/// Pricing is the constant product formula with the fixed 997/1000 fee
/// taken off the input:
///
/// `output = amount_in * 997 * output_reserve / (input_reserve * 1000 + amount_in * 997)`
///
/// truncated toward zero. For `input_reserve > 0` the output is strictly
/// below `output_reserve`.
///
/// # Arguments
/// * `amount_in` - Amount of the input asset entering the pool
/// * `input_reserve` - Pool reserve of the input asset before the trade
/// * `output_reserve` - Pool reserve of the output asset before the trade
pub fn get_amount_out(
    amount_in: u128,
    input_reserve: u128,
    output_reserve: u128,
) -> std::result::Result<u128, ErrorCode> {
    if amount_in == 0 {
        return Err(ErrorCode::InvalidSwapValue);
    }

    let amount_in_with_fee = U256::from(amount_in)
        .checked_mul(U256::from(FEE_NUMERATOR))
        .ok_or(ErrorCode::MathOverflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(U256::from(output_reserve))
        .ok_or(ErrorCode::MathOverflow)?;
    let denominator = U256::from(input_reserve)
        .checked_mul(U256::from(FEE_DENOMINATOR))
        .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
        .ok_or(ErrorCode::MathOverflow)?;

    numerator
        .checked_div(denominator)
        .and_then(to_u128)
        .ok_or(ErrorCode::MathOverflow)
}

impl Pool {
    /// Sell `amount_in` of base currency (sent with the call) for tokens.
    ///
    /// Returns the token amount paid out.
    pub fn swap_base_for_token<R: Runtime>(
        &mut self,
        runtime: &mut R,
        caller: Pubkey,
        amount_in: u128,
    ) -> Result<u128> {
        self.atomically(runtime, |pool, runtime| {
            require!(amount_in > 0, ErrorCode::InvalidSwapValue);
            require!(pool.is_initialized(), ErrorCode::PoolNotInitialized);

            pool.receive_base(runtime, &caller, amount_in)?;

            // live balance includes amount_in
            let reserves = pool.reserves(runtime, amount_in)?;
            let amount_out = get_amount_out(amount_in, reserves.base, reserves.token)?;

            pool.pay_tokens(runtime, &caller, amount_out)?;

            pool.record_swap(runtime, caller, amount_in, amount_out, SwapDirection::BaseForToken);
            Ok(amount_out)
        })
    }

    /// Sell `amount_in` tokens, pulled from `caller` by delegated transfer,
    /// for base currency.
    ///
    /// Returns the base amount paid out.
    pub fn swap_token_for_base<R: Runtime>(
        &mut self,
        runtime: &mut R,
        caller: Pubkey,
        amount_in: u128,
    ) -> Result<u128> {
        self.atomically(runtime, |pool, runtime| {
            require!(amount_in > 0, ErrorCode::InvalidSwapValue);
            require!(pool.is_initialized(), ErrorCode::PoolNotInitialized);

            let reserves = pool.get_reserves(runtime)?;
            let amount_out = get_amount_out(amount_in, reserves.token, reserves.base)?;

            pool.pull_tokens(runtime, &caller, amount_in)?;
            pool.pay_base(runtime, &caller, amount_out)?;

            pool.record_swap(runtime, caller, amount_in, amount_out, SwapDirection::TokenForBase);
            Ok(amount_out)
        })
    }

    /// Output a swap of `amount_in` would pay against the current reserves
    pub fn preview_swap<R: Runtime>(
        &self,
        runtime: &R,
        direction: SwapDirection,
        amount_in: u128,
    ) -> Result<u128> {
        require!(amount_in > 0, ErrorCode::InvalidSwapValue);
        require!(self.is_initialized(), ErrorCode::PoolNotInitialized);
        let reserves = self.get_reserves(runtime)?;
        let amount_out = match direction {
            SwapDirection::BaseForToken => get_amount_out(amount_in, reserves.base, reserves.token)?,
            SwapDirection::TokenForBase => get_amount_out(amount_in, reserves.token, reserves.base)?,
        };
        Ok(amount_out)
    }

    fn record_swap<R: Runtime>(
        &self,
        runtime: &mut R,
        caller: Pubkey,
        amount_in: u128,
        amount_out: u128,
        direction: SwapDirection,
    ) {
        msg!("swap {:?} by {}: in {} out {}", direction, caller, amount_in, amount_out);
        runtime.emit(
            Swap {
                caller,
                amount_in,
                amount_out,
                direction,
            }
            .into(),
        );
    }
}
