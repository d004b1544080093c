use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::{ErrorCode, MIN_BASE, MIN_TOKEN};

/// Deployment-time calibration of a pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub min_base: u128,  // smallest base amount accepted by initialize
    pub min_token: u128, // smallest token amount accepted by initialize
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_base: MIN_BASE,
            min_token: MIN_TOKEN,
        }
    }
}

/// Pre-operation view of the pool's live balances
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reserves {
    pub base: u128,
    pub token: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    BaseForToken,
    TokenForBase,
}

/// Which side of the pool an amount is denominated in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Base,
    Token,
}

impl TryFrom<u8> for TokenKind {
    type Error = ErrorCode;

    fn try_from(tag: u8) -> std::result::Result<Self, Self::Error> {
        match tag {
            0 => Ok(TokenKind::Base),
            1 => Ok(TokenKind::Token),
            _ => Err(ErrorCode::UnsupportedTokenKind),
        }
    }
}

/// Serializable snapshot of the share ledger, stored as account data
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub owner: Pubkey,
    pub address: Pubkey,
    pub config: PoolConfig,
    pub total_liquidity: u128,
    pub providers: Vec<(Pubkey, u128)>,
}

/// The pool singleton.
///
/// Only share accounting is stored here. Reserves are always read live from
/// the runtime's balances for `address`.
#[derive(Debug)]
pub struct Pool {
    pub(crate) owner: Pubkey,
    pub(crate) address: Pubkey,
    pub(crate) config: PoolConfig,
    pub(crate) total_liquidity: u128,
    pub(crate) liquidity_of: BTreeMap<Pubkey, u128>,
}

/// Share ledger captured before an operation, restored if it fails
pub(crate) struct ShareSnapshot {
    total_liquidity: u128,
    liquidity_of: BTreeMap<Pubkey, u128>,
}

impl Pool {
    pub(crate) fn snapshot_shares(&self) -> ShareSnapshot {
        ShareSnapshot {
            total_liquidity: self.total_liquidity,
            liquidity_of: self.liquidity_of.clone(),
        }
    }

    pub(crate) fn restore_shares(&mut self, snapshot: ShareSnapshot) {
        self.total_liquidity = snapshot.total_liquidity;
        self.liquidity_of = snapshot.liquidity_of;
    }

    pub(crate) fn credit_shares(&mut self, provider: Pubkey, shares: u128) -> Result<()> {
        let balance = self.liquidity_of.get(&provider).copied().unwrap_or(0);
        let balance = balance.checked_add(shares).ok_or(ErrorCode::MathOverflow)?;
        self.total_liquidity = self
            .total_liquidity
            .checked_add(shares)
            .ok_or(ErrorCode::MathOverflow)?;
        if balance > 0 {
            self.liquidity_of.insert(provider, balance);
        }
        Ok(())
    }

    pub(crate) fn debit_shares(&mut self, provider: Pubkey, shares: u128) -> Result<()> {
        let balance = self.liquidity_of.get(&provider).copied().unwrap_or(0);
        require!(balance >= shares, ErrorCode::NotEnoughLiquidity);
        let balance = balance - shares;
        self.total_liquidity = self
            .total_liquidity
            .checked_sub(shares)
            .ok_or(ErrorCode::MathUnderflow)?;
        if balance == 0 {
            self.liquidity_of.remove(&provider);
        } else {
            self.liquidity_of.insert(provider, balance);
        }
        Ok(())
    }
}
