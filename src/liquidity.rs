//! Liquidity operations for the pool
//!
//! Shares are denominated in base-currency units. A deposit mints shares in
//! proportion to the base it adds, and a withdrawal burns the base amount
//! the requested tokens are worth at the current ratio.

use anchor_lang::prelude::*;

use crate::{
    events::{LiquidityAdded, LiquidityRemoved},
    runtime::Runtime,
    state::{Pool, TokenKind},
    utils::floor_div,
    ErrorCode,
};

/// Counterpart of `amount` at the current reserve ratio
///
/// # Arguments
/// * `amount` - Amount being quoted, denominated in `kind`
/// * `kind` - `Base` quotes tokens for a base amount, `Token` quotes base for a token amount
/// * `base_reserve` - Base reserve of the pool
/// * `token_reserve` - Token reserve of the pool
///
/// # Returns
/// `amount * token_reserve / base_reserve` for `Base`,
/// `amount * base_reserve / token_reserve` for `Token`, truncated
pub fn quote(
    amount: u128,
    kind: TokenKind,
    base_reserve: u128,
    token_reserve: u128,
) -> std::result::Result<u128, ErrorCode> {
    if amount == 0 {
        return Err(ErrorCode::InvalidLiquidityAmount);
    }

    let (numerator, denominator) = match kind {
        TokenKind::Base => (token_reserve, base_reserve),
        TokenKind::Token => (base_reserve, token_reserve),
    };
    floor_div(amount, numerator, denominator).ok_or(ErrorCode::MathOverflow)
}

/// `quote` for a raw side tag: `0` is base, `1` is token
pub fn quote_tagged(
    amount: u128,
    tag: u8,
    base_reserve: u128,
    token_reserve: u128,
) -> std::result::Result<u128, ErrorCode> {
    if amount == 0 {
        return Err(ErrorCode::InvalidLiquidityAmount);
    }
    quote(amount, TokenKind::try_from(tag)?, base_reserve, token_reserve)
}

/// Calculate the shares to mint for a deposit
///
/// # Arguments
/// * `base_amount` - Base currency being deposited
/// * `total_lp_supply` - Shares outstanding before the deposit
/// * `base_reserve` - Base reserve before the deposit
pub fn deposit_lp(
    base_amount: u128,
    total_lp_supply: u128,
    base_reserve: u128,
) -> std::result::Result<u128, ErrorCode> {
    floor_div(base_amount, total_lp_supply, base_reserve).ok_or(ErrorCode::MathOverflow)
}

/// Calculate the base currency (and shares to burn) owed for withdrawing
/// `token_amount` tokens
pub fn withdraw_lp(
    token_amount: u128,
    base_reserve: u128,
    token_reserve: u128,
) -> std::result::Result<u128, ErrorCode> {
    quote(token_amount, TokenKind::Token, base_reserve, token_reserve)
}

impl Pool {
    /// Deposit `base_amount` (sent with the call) and `token_amount` tokens
    /// at the current ratio.
    ///
    /// Returns the shares minted.
    pub fn provide_liquidity<R: Runtime>(
        &mut self,
        runtime: &mut R,
        provider: Pubkey,
        token_amount: u128,
        base_amount: u128,
    ) -> Result<u128> {
        self.atomically(runtime, |pool, runtime| {
            require!(pool.is_initialized(), ErrorCode::PoolNotInitialized);

            pool.receive_base(runtime, &provider, base_amount)?;
            let reserves = pool.reserves(runtime, base_amount)?;

            let token_required = quote(base_amount, TokenKind::Base, reserves.base, reserves.token)?;
            let base_required = quote(token_amount, TokenKind::Token, reserves.base, reserves.token)?;
            require!(
                base_amount >= base_required,
                ErrorCode::InsufficientBaseProvided
            );
            require!(
                token_amount >= token_required,
                ErrorCode::InsufficientTokenProvided
            );

            pool.pull_tokens(runtime, &provider, token_amount)?;

            let shares = deposit_lp(base_amount, pool.total_liquidity, reserves.base)?;
            pool.credit_shares(provider, shares)?;

            msg!(
                "liquidity added by {}: base {} token {} shares {}",
                provider,
                base_amount,
                token_amount,
                shares
            );
            runtime.emit(
                LiquidityAdded {
                    provider,
                    base_amount,
                    token_amount,
                }
                .into(),
            );
            Ok(shares)
        })
    }

    /// Withdraw `token_amount` tokens plus the base currency they are worth
    /// at the current ratio, burning that base amount in shares.
    ///
    /// Returns the base amount paid out.
    pub fn withdraw_liquidity<R: Runtime>(
        &mut self,
        runtime: &mut R,
        provider: Pubkey,
        token_amount: u128,
    ) -> Result<u128> {
        self.atomically(runtime, |pool, runtime| {
            require!(pool.is_initialized(), ErrorCode::PoolNotInitialized);

            let reserves = pool.get_reserves(runtime)?;
            let base_owed = withdraw_lp(token_amount, reserves.base, reserves.token)?;
            require!(
                pool.liquidity_of(&provider) >= base_owed,
                ErrorCode::NotEnoughLiquidity
            );

            pool.debit_shares(provider, base_owed)?;

            pool.pay_tokens(runtime, &provider, token_amount)?;
            pool.pay_base(runtime, &provider, base_owed)?;

            msg!(
                "liquidity removed by {}: token {} base {}",
                provider,
                token_amount,
                base_owed
            );
            runtime.emit(
                LiquidityRemoved {
                    provider,
                    token_amount,
                }
                .into(),
            );
            Ok(base_owed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::PoolEvent, pool::fixtures::*, state::Reserves};
    use proptest::prelude::*;

    #[test]
    fn test_quote_both_directions() {
        assert_eq!(quote(100, TokenKind::Base, 1000, 2000).unwrap(), 200);
        assert_eq!(quote(200, TokenKind::Token, 1000, 2000).unwrap(), 100);
    }

    #[test]
    fn test_quote_truncates() {
        // 7 * 1000 / 3 = 2333.33
        assert_eq!(quote(7, TokenKind::Token, 1000, 3).unwrap(), 2333);
        // 2333 * 3 / 1000 = 6.999
        assert_eq!(quote(2333, TokenKind::Base, 1000, 3).unwrap(), 6);
    }

    #[test]
    fn test_quote_zero_amount() {
        assert!(matches!(
            quote(0, TokenKind::Base, 1000, 2000),
            Err(ErrorCode::InvalidLiquidityAmount)
        ));
    }

    #[test]
    fn test_quote_tagged() {
        assert_eq!(quote_tagged(100, 0, 1000, 2000).unwrap(), 200);
        assert_eq!(quote_tagged(100, 1, 1000, 2000).unwrap(), 50);
        assert!(matches!(
            quote_tagged(100, 7, 1000, 2000),
            Err(ErrorCode::UnsupportedTokenKind)
        ));
        assert!(matches!(
            quote_tagged(0, 7, 1000, 2000),
            Err(ErrorCode::InvalidLiquidityAmount)
        ));
    }

    #[test]
    fn test_deposit_lp_existing() {
        let result = deposit_lp(100, 1000, 1000).unwrap();
        assert_eq!(result, 100); // 100 * 1000 / 1000 = 100
    }

    #[test]
    fn test_deposit_lp_uneven_supply() {
        let result = deposit_lp(100, 1000, 3000).unwrap();
        assert_eq!(result, 33); // 100 * 1000 / 3000 = 33.33
    }

    #[test]
    fn test_withdraw_lp() {
        let base = withdraw_lp(200, 1000, 2000).unwrap();
        assert_eq!(base, 100); // 200 * 1000 / 2000 = 100
    }

    #[test]
    fn test_provide_before_initialize() {
        let mut fixture = Fixture::new();
        let alice = fixture.alice;

        let err = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, UNIT, UNIT / 1000)
            .unwrap_err();
        assert_eq!(err, ErrorCode::PoolNotInitialized.into());
        assert_eq!(fixture.native(&alice), 1000 * UNIT);
    }

    #[test]
    fn test_provide_liquidity_at_ratio() {
        let mut fixture = Fixture::initialized();
        let alice = fixture.alice;

        // pool is 0.01 base : 10 tokens, so 0.001 base pairs with 1 token
        let shares = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, UNIT, UNIT / 1000)
            .unwrap();

        assert_eq!(shares, UNIT / 1000);
        assert_eq!(fixture.pool.liquidity_of(&alice), UNIT / 1000);
        assert_eq!(fixture.pool.total_liquidity(), UNIT / 100 + UNIT / 1000);
        assert_eq!(fixture.shares_sum(), fixture.pool.total_liquidity());
        assert_eq!(
            fixture.reserves(),
            Reserves {
                base: UNIT / 100 + UNIT / 1000,
                token: 11 * UNIT,
            }
        );
        assert_eq!(
            fixture.runtime.events(),
            &[PoolEvent::LiquidityAdded(LiquidityAdded {
                provider: alice,
                base_amount: UNIT / 1000,
                token_amount: UNIT,
            })]
        );
    }

    #[test]
    fn test_provide_liquidity_after_swap_mints_proportional_shares() {
        let mut fixture = Fixture::initialized();
        let (alice, bob) = (fixture.alice, fixture.bob);
        fixture
            .pool
            .swap_base_for_token(&mut fixture.runtime, alice, 9 * UNIT / 1000)
            .unwrap();

        // 0.019 base against 0.01 shares outstanding
        let reserves = fixture.reserves();
        assert_eq!(reserves.base, 19 * UNIT / 1000);
        let total = fixture.pool.total_liquidity();
        assert_eq!(total, UNIT / 100);

        let base = UNIT / 1000;
        let tokens = quote(base, TokenKind::Base, reserves.base, reserves.token).unwrap();
        assert_eq!(tokens, 277_402_513_821_580_251);

        let shares = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, bob, tokens, base)
            .unwrap();

        // 10^15 * 10^16 / (19 * 10^15) = 526_315_789_473_684.21
        assert_eq!(shares, 526_315_789_473_684);
        assert_eq!(shares, base * total / reserves.base);
        assert_ne!(shares, base);
        assert_eq!(fixture.pool.liquidity_of(&bob), shares);
        assert_eq!(fixture.pool.total_liquidity(), total + shares);
        assert_eq!(
            fixture.reserves(),
            Reserves {
                base: reserves.base + base,
                token: reserves.token + tokens,
            }
        );
    }

    #[test]
    fn test_provide_insufficient_token() {
        let mut fixture = Fixture::initialized();
        let alice = fixture.alice;

        let err = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, UNIT / 10, UNIT / 1000)
            .unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientTokenProvided.into());
        assert_eq!(fixture.native(&alice), 1000 * UNIT);
        assert_eq!(fixture.pool.liquidity_of(&alice), 0);
    }

    #[test]
    fn test_provide_insufficient_base() {
        let mut fixture = Fixture::initialized();
        let alice = fixture.alice;

        let err = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, 2 * UNIT, UNIT / 1000)
            .unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientBaseProvided.into());
    }

    #[test]
    fn test_provide_zero_amounts() {
        let mut fixture = Fixture::initialized();
        let alice = fixture.alice;

        let err = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, UNIT, 0)
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidLiquidityAmount.into());
    }

    #[test]
    fn test_provide_rolls_back_on_failed_token_pull() {
        let mut fixture = Fixture::initialized();
        let alice = fixture.alice;
        fixture.runtime.approve(&alice, &fixture.pool.address(), 0);
        let before = fixture.reserves();

        let err = fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, UNIT, UNIT / 1000)
            .unwrap_err();

        assert_eq!(err, ErrorCode::TransferFailed.into());
        assert_eq!(fixture.reserves(), before);
        assert_eq!(fixture.pool.liquidity_of(&alice), 0);
        assert_eq!(fixture.pool.total_liquidity(), UNIT / 100);
        assert!(fixture.runtime.events().is_empty());
    }

    #[test]
    fn test_withdraw_more_than_owned() {
        let mut fixture = Fixture::initialized();
        let (owner, alice) = (fixture.owner, fixture.alice);

        let err = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, alice, UNIT)
            .unwrap_err();
        assert_eq!(err, ErrorCode::NotEnoughLiquidity.into());

        // owner holds 0.01 shares, 11 tokens are worth 0.011 base
        let err = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, owner, 11 * UNIT)
            .unwrap_err();
        assert_eq!(err, ErrorCode::NotEnoughLiquidity.into());
        assert_eq!(fixture.pool.liquidity_of(&owner), UNIT / 100);
    }

    #[test]
    fn test_withdraw_exact_share() {
        let mut fixture = Fixture::initialized();
        let (owner, alice) = (fixture.owner, fixture.alice);
        fixture
            .pool
            .provide_liquidity(&mut fixture.runtime, alice, UNIT, UNIT / 1000)
            .unwrap();

        let base = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, alice, UNIT)
            .unwrap();

        assert_eq!(base, UNIT / 1000);
        assert_eq!(fixture.pool.liquidity_of(&alice), 0);
        assert_eq!(fixture.pool.total_liquidity(), UNIT / 100);
        assert_eq!(fixture.pool.liquidity_of(&owner), UNIT / 100);
        assert_eq!(fixture.native(&alice), 1000 * UNIT);
        assert_eq!(fixture.tokens(&alice), 1000 * UNIT);
        assert_eq!(
            fixture.reserves(),
            Reserves {
                base: UNIT / 100,
                token: 10 * UNIT,
            }
        );
        assert_eq!(
            fixture.runtime.events().last(),
            Some(&PoolEvent::LiquidityRemoved(LiquidityRemoved {
                provider: alice,
                token_amount: UNIT,
            }))
        );
    }

    #[test]
    fn test_withdraw_partial() {
        let mut fixture = Fixture::initialized();
        let owner = fixture.owner;

        let base = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, owner, 4 * UNIT)
            .unwrap();

        assert_eq!(base, 4 * UNIT / 1000);
        assert_eq!(fixture.pool.liquidity_of(&owner), 6 * UNIT / 1000);
        assert_eq!(fixture.pool.total_liquidity(), 6 * UNIT / 1000);
        assert_eq!(
            fixture.reserves(),
            Reserves {
                base: 6 * UNIT / 1000,
                token: 6 * UNIT,
            }
        );
    }

    #[test]
    fn test_withdraw_rolls_back_share_debit() {
        let mut fixture = Fixture::initialized();
        let owner = fixture.owner;
        fixture.runtime.reject_native(&owner);
        let before = fixture.reserves();

        let err = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, owner, UNIT)
            .unwrap_err();

        assert_eq!(err, ErrorCode::TransferFailed.into());
        assert_eq!(fixture.pool.liquidity_of(&owner), UNIT / 100);
        assert_eq!(fixture.pool.total_liquidity(), UNIT / 100);
        assert_eq!(fixture.reserves(), before);
        assert_eq!(fixture.tokens(&owner), 990 * UNIT);
    }

    #[test]
    fn test_withdraw_token_payout_rejected_rolls_back_share_debit() {
        let mut fixture = Fixture::initialized();
        let owner = fixture.owner;
        fixture.runtime.freeze_tokens(&owner);
        let before = fixture.reserves();

        let err = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, owner, UNIT)
            .unwrap_err();

        assert_eq!(err, ErrorCode::TransferFailed.into());
        assert_eq!(fixture.pool.liquidity_of(&owner), UNIT / 100);
        assert_eq!(fixture.pool.total_liquidity(), UNIT / 100);
        assert_eq!(fixture.reserves(), before);
        assert_eq!(fixture.native(&owner), 1000 * UNIT - UNIT / 100);
        assert!(fixture.runtime.events().is_empty());
    }

    #[test]
    fn test_withdraw_zero_tokens() {
        let mut fixture = Fixture::initialized();
        let owner = fixture.owner;

        let err = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, owner, 0)
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidLiquidityAmount.into());
    }

    #[test]
    fn test_withdraw_after_swap_pays_at_new_ratio() {
        let mut fixture = Fixture::initialized();
        let (owner, alice) = (fixture.owner, fixture.alice);
        fixture
            .pool
            .swap_base_for_token(&mut fixture.runtime, alice, 9 * UNIT / 1000)
            .unwrap();
        let reserves = fixture.reserves();

        let base = fixture
            .pool
            .withdraw_liquidity(&mut fixture.runtime, owner, UNIT)
            .unwrap();

        assert_eq!(base, UNIT * reserves.base / reserves.token);
        assert_eq!(fixture.pool.liquidity_of(&owner), UNIT / 100 - base);
        assert_eq!(fixture.shares_sum(), fixture.pool.total_liquidity());
    }

    proptest! {
        #[test]
        fn prop_quote_round_trip_never_grows(
            x in 1u128..=10u128.pow(18),
            base_reserve in 1u128..=10u128.pow(18),
            token_reserve in 1u128..=10u128.pow(18),
        ) {
            let tokens = quote(x, TokenKind::Base, base_reserve, token_reserve).unwrap();
            prop_assume!(tokens > 0);
            let back = quote(tokens, TokenKind::Token, base_reserve, token_reserve).unwrap();
            prop_assert!(back <= x);
        }

        #[test]
        fn prop_shares_sum_to_total(
            deposits in prop::collection::vec(1u128..=100u128, 1..8),
            withdrawals in prop::collection::vec(1u128..=100u128, 0..8),
        ) {
            let mut fixture = Fixture::initialized();
            let providers = [fixture.alice, fixture.bob];

            // each step deposits `n` thousandths of a base unit with the matching tokens
            for (i, n) in deposits.iter().enumerate() {
                let provider = providers[i % 2];
                let reserves = fixture.reserves();
                let base = n * UNIT / 1000;
                let tokens = quote(base, TokenKind::Base, reserves.base, reserves.token).unwrap();
                fixture
                    .pool
                    .provide_liquidity(&mut fixture.runtime, provider, tokens, base)
                    .unwrap();
                prop_assert_eq!(fixture.shares_sum(), fixture.pool.total_liquidity());
            }

            for (i, n) in withdrawals.iter().enumerate() {
                let provider = providers[i % 2];
                let result = fixture
                    .pool
                    .withdraw_liquidity(&mut fixture.runtime, provider, n * UNIT / 100);
                if let Err(err) = result {
                    prop_assert_eq!(err, anchor_lang::error::Error::from(ErrorCode::NotEnoughLiquidity));
                }
                prop_assert_eq!(fixture.shares_sum(), fixture.pool.total_liquidity());
            }

            // the owner still holds 0.01 shares; 0.01 tokens are worth about 10^13
            let owner = fixture.owner;
            let owned = fixture.pool.liquidity_of(&owner);
            let base = fixture
                .pool
                .withdraw_liquidity(&mut fixture.runtime, owner, UNIT / 100)
                .unwrap();
            prop_assert!(base > 0);
            prop_assert_eq!(fixture.pool.liquidity_of(&owner), owned - base);
            prop_assert_eq!(fixture.shares_sum(), fixture.pool.total_liquidity());
        }
    }
}
