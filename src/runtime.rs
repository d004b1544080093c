use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;

use crate::{events::PoolEvent, TOKEN_DECIMALS};

/// Fungible token ledger the pool trades against.
///
/// Transfers report success instead of erroring; the pool maps a `false`
/// to `TransferFailed` and reverts.
pub trait TokenLedger {
    fn mint(&mut self, to: &Pubkey, amount: u128);
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> bool;
    fn transfer_from(&mut self, spender: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128)
        -> bool;
    fn balance_of(&self, holder: &Pubkey) -> u128;
    fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }
}

/// Base currency of the hosting environment
pub trait NativeCurrency {
    fn native_balance(&self, holder: &Pubkey) -> u128;
    /// Best-effort push transfer
    fn send_native(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> bool;
}

/// Everything a pool operation touches outside its own share ledger.
///
/// `checkpoint`/`revert` give the all-or-nothing semantics of a transaction:
/// balance moves and emitted events after a checkpoint are discarded when
/// the operation fails.
pub trait Runtime: TokenLedger + NativeCurrency {
    type Checkpoint;

    fn checkpoint(&mut self) -> Self::Checkpoint;
    fn commit(&mut self, checkpoint: Self::Checkpoint);
    fn revert(&mut self, checkpoint: Self::Checkpoint);
    fn emit(&mut self, event: PoolEvent);
}

/// Everything `MemoryRuntime` rolls back on revert
#[derive(Clone, Debug, Default)]
pub struct Balances {
    tokens: BTreeMap<Pubkey, u128>,
    allowances: BTreeMap<(Pubkey, Pubkey), u128>,
    native: BTreeMap<Pubkey, u128>,
    events: Vec<PoolEvent>,
}

/// In-memory runtime with fault injection
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    balances: Balances,
    native_rejecting: BTreeSet<Pubkey>,
    tokens_frozen: BTreeSet<Pubkey>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit base currency out of thin air
    pub fn fund(&mut self, holder: &Pubkey, amount: u128) {
        let balance = self.balances.native.entry(*holder).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) {
        self.balances.allowances.insert((*owner, *spender), amount);
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.balances
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// `holder` refuses incoming base currency
    pub fn reject_native(&mut self, holder: &Pubkey) {
        self.native_rejecting.insert(*holder);
    }

    /// Any token transfer to or from `holder` fails
    pub fn freeze_tokens(&mut self, holder: &Pubkey) {
        self.tokens_frozen.insert(*holder);
    }

    pub fn unfreeze_tokens(&mut self, holder: &Pubkey) {
        self.tokens_frozen.remove(holder);
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.balances.events
    }

    fn move_tokens(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> bool {
        if self.tokens_frozen.contains(from) || self.tokens_frozen.contains(to) {
            return false;
        }
        shift(&mut self.balances.tokens, from, to, amount)
    }

    fn token_balance(&self, holder: &Pubkey) -> u128 {
        self.balances.tokens.get(holder).copied().unwrap_or(0)
    }
}

/// Move `amount` between two holders; `ledger` is untouched when either side would wrap
fn shift(ledger: &mut BTreeMap<Pubkey, u128>, from: &Pubkey, to: &Pubkey, amount: u128) -> bool {
    let Some(remaining) = ledger.get(from).copied().unwrap_or(0).checked_sub(amount) else {
        return false;
    };
    if from == to {
        return true;
    }
    let Some(credited) = ledger.get(to).copied().unwrap_or(0).checked_add(amount) else {
        return false;
    };
    ledger.insert(*from, remaining);
    ledger.insert(*to, credited);
    true
}

impl TokenLedger for MemoryRuntime {
    fn mint(&mut self, to: &Pubkey, amount: u128) {
        let balance = self.balances.tokens.entry(*to).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> bool {
        self.move_tokens(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> bool {
        let Some(remaining) = self.allowance(from, spender).checked_sub(amount) else {
            return false;
        };
        if !self.move_tokens(from, to, amount) {
            return false;
        }
        self.balances.allowances.insert((*from, *spender), remaining);
        true
    }

    fn balance_of(&self, holder: &Pubkey) -> u128 {
        self.token_balance(holder)
    }
}

impl NativeCurrency for MemoryRuntime {
    fn native_balance(&self, holder: &Pubkey) -> u128 {
        self.balances.native.get(holder).copied().unwrap_or(0)
    }

    fn send_native(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> bool {
        if self.native_rejecting.contains(to) {
            return false;
        }
        shift(&mut self.balances.native, from, to, amount)
    }
}

impl Runtime for MemoryRuntime {
    type Checkpoint = Balances;

    fn checkpoint(&mut self) -> Self::Checkpoint {
        self.balances.clone()
    }

    fn commit(&mut self, _checkpoint: Self::Checkpoint) {}

    fn revert(&mut self, checkpoint: Self::Checkpoint) {
        self.balances = checkpoint;
    }

    fn emit(&mut self, event: PoolEvent) {
        self.balances.events.push(event);
    }
}
