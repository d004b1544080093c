use anchor_lang::prelude::*;

use crate::state::SwapDirection;

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub caller: Pubkey,
    pub amount_in: u128,
    pub amount_out: u128,
    pub direction: SwapDirection,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityAdded {
    pub provider: Pubkey,
    pub base_amount: u128,
    pub token_amount: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityRemoved {
    pub provider: Pubkey,
    pub token_amount: u128,
}

/// Log record handed to the runtime's event sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    Swap(Swap),
    LiquidityAdded(LiquidityAdded),
    LiquidityRemoved(LiquidityRemoved),
}

impl From<Swap> for PoolEvent {
    fn from(event: Swap) -> Self {
        PoolEvent::Swap(event)
    }
}

impl From<LiquidityAdded> for PoolEvent {
    fn from(event: LiquidityAdded) -> Self {
        PoolEvent::LiquidityAdded(event)
    }
}

impl From<LiquidityRemoved> for PoolEvent {
    fn from(event: LiquidityRemoved) -> Self {
        PoolEvent::LiquidityRemoved(event)
    }
}
