use anchor_lang::prelude::Pubkey;
use cp_pool::{MemoryRuntime, Pool, PoolConfig, TokenLedger};

const UNIT: u128 = 1_000_000_000_000_000_000;

fn main() -> anchor_lang::Result<()> {
    let mut runtime = MemoryRuntime::new();
    let owner = Pubkey::new_unique();
    let trader = Pubkey::new_unique();
    let mut pool = Pool::new(owner, Pubkey::new_unique(), PoolConfig::default());

    for user in [owner, trader] {
        runtime.fund(&user, 100 * UNIT);
        runtime.mint(&user, 100 * UNIT);
        runtime.approve(&user, &pool.address(), u128::MAX);
    }

    // 0.01 base against 10 tokens
    pool.initialize(&mut runtime, owner, 10 * UNIT, UNIT / 100)?;
    let reserves = pool.get_reserves(&runtime)?;
    println!("reserves: base {} token {}", reserves.base, reserves.token);

    let out = pool.swap_base_for_token(&mut runtime, trader, 9 * UNIT / 1000)?;
    println!("swapped 0.009 base for {} tokens", out);

    let back = pool.swap_token_for_base(&mut runtime, trader, out)?;
    println!("swapped {} tokens back for {} base", out, back);

    let reserves = pool.get_reserves(&runtime)?;
    println!("reserves: base {} token {}", reserves.base, reserves.token);
    println!("total shares: {}", pool.total_liquidity());

    Ok(())
}
