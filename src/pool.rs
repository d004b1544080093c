use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::{
    runtime::Runtime,
    state::{Pool, PoolConfig, PoolState, Reserves},
    ErrorCode,
};

impl Pool {
    /// Create an uninitialized pool owned by `owner`, holding its balances at `address`
    pub fn new(owner: Pubkey, address: Pubkey, config: PoolConfig) -> Self {
        Self {
            owner,
            address,
            config,
            total_liquidity: 0,
            liquidity_of: BTreeMap::new(),
        }
    }

    pub fn from_state(state: PoolState) -> Self {
        Self {
            owner: state.owner,
            address: state.address,
            config: state.config,
            total_liquidity: state.total_liquidity,
            liquidity_of: state.providers.into_iter().collect(),
        }
    }

    pub fn state(&self) -> PoolState {
        PoolState {
            owner: self.owner,
            address: self.address,
            config: self.config,
            total_liquidity: self.total_liquidity,
            providers: self.providers().collect(),
        }
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn total_liquidity(&self) -> u128 {
        self.total_liquidity
    }

    pub fn liquidity_of(&self, provider: &Pubkey) -> u128 {
        self.liquidity_of.get(provider).copied().unwrap_or(0)
    }

    /// Providers with a nonzero share balance
    pub fn providers(&self) -> impl Iterator<Item = (Pubkey, u128)> + '_ {
        self.liquidity_of
            .iter()
            .map(|(provider, shares)| (*provider, *shares))
    }

    pub fn is_initialized(&self) -> bool {
        self.total_liquidity > 0
    }

    /// Current `(base, token)` reserves as held by the pool right now
    pub fn get_reserves<R: Runtime>(&self, runtime: &R) -> Result<Reserves> {
        self.reserves(runtime, 0)
    }

    /// Live reserves with `received_base` taken back out of the base side.
    ///
    /// Payable operations have already been credited with the caller's
    /// payment by the time they read balances; passing that amount here
    /// yields the reserves as they stood before the call.
    pub fn reserves<R: Runtime>(&self, runtime: &R, received_base: u128) -> Result<Reserves> {
        let base = runtime
            .native_balance(&self.address)
            .checked_sub(received_base)
            .ok_or(ErrorCode::MathUnderflow)?;
        Ok(Reserves {
            base,
            token: runtime.balance_of(&self.address),
        })
    }

    /// Seed the pool with `base_amount` of base currency and `token_amount`
    /// tokens pulled from `caller`. The caller receives shares equal to the
    /// pool's base balance.
    pub fn initialize<R: Runtime>(
        &mut self,
        runtime: &mut R,
        caller: Pubkey,
        token_amount: u128,
        base_amount: u128,
    ) -> Result<()> {
        self.atomically(runtime, |pool, runtime| {
            require!(
                pool.total_liquidity == 0,
                ErrorCode::PoolAlreadyInitialized
            );
            require!(
                base_amount >= pool.config.min_base && token_amount >= pool.config.min_token,
                ErrorCode::InvalidRatio
            );

            pool.receive_base(runtime, &caller, base_amount)?;

            let shares = runtime.native_balance(&pool.address);
            require!(shares > 0, ErrorCode::InvalidRatio);
            pool.credit_shares(caller, shares)?;

            pool.pull_tokens(runtime, &caller, token_amount)?;

            msg!(
                "pool initialized by {}: base {} token {} shares {}",
                caller,
                base_amount,
                token_amount,
                shares
            );
            Ok(())
        })
    }

    /// Run `op` as one transaction: on error, the share ledger and every
    /// runtime effect since entry are rolled back.
    pub(crate) fn atomically<R, T, F>(&mut self, runtime: &mut R, op: F) -> Result<T>
    where
        R: Runtime,
        F: FnOnce(&mut Self, &mut R) -> Result<T>,
    {
        let checkpoint = runtime.checkpoint();
        let shares = self.snapshot_shares();

        match op(self, runtime) {
            Ok(value) => {
                runtime.commit(checkpoint);
                Ok(value)
            }
            Err(err) => {
                self.restore_shares(shares);
                runtime.revert(checkpoint);
                msg!("pool operation reverted: {}", err);
                Err(err)
            }
        }
    }

    /// Move the base payment accompanying a call into the pool
    pub(crate) fn receive_base<R: Runtime>(
        &self,
        runtime: &mut R,
        from: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        require!(
            runtime.send_native(from, &self.address, amount),
            ErrorCode::TransferFailed
        );
        Ok(())
    }

    pub(crate) fn pay_base<R: Runtime>(
        &self,
        runtime: &mut R,
        to: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        require!(
            runtime.send_native(&self.address, to, amount),
            ErrorCode::TransferFailed
        );
        Ok(())
    }

    /// Delegated pull; `from` must have approved the pool address
    pub(crate) fn pull_tokens<R: Runtime>(
        &self,
        runtime: &mut R,
        from: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        require!(
            runtime.transfer_from(&self.address, from, &self.address, amount),
            ErrorCode::TransferFailed
        );
        Ok(())
    }

    pub(crate) fn pay_tokens<R: Runtime>(
        &self,
        runtime: &mut R,
        to: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        require!(
            runtime.transfer(&self.address, to, amount),
            ErrorCode::TransferFailed
        );
        Ok(())
    }
}
