//! Strategy adapters
//!
//! A closed set of strategy kinds, each exposing the same three
//! capabilities: `invest(amount) -> position`, `divest(position) -> amount`
//! and a read-only `valuate(position) -> amount`. The engine only ever talks
//! to a venue through these.

use anchor_lang::prelude::*;

pub mod lending;
pub mod liquidity_pool;

pub use lending::*;
pub use liquidity_pool::*;

use crate::state::{LendingMarket, LiquidityPool};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum StrategyKind {
    Lending,
    LiquidityPool,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Lending, StrategyKind::LiquidityPool];
}

/// Result of deploying assets into a strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Investment {
    /// Position units gained (receipts or LP tokens)
    pub position_delta: u64,
    /// Base asset that ended up in the venue's position
    pub base_amount: u64,
    /// Counter asset supplied alongside the base asset
    pub counter_amount: u64,
    /// Base asset swapped into the counter asset before supplying
    pub swapped_amount: u64,
    /// Base asset the venue could not absorb; stays idle in the vault
    pub returned: u64,
}

impl Investment {
    /// Base asset that actually left the vault
    pub fn consumed(&self, offered: u64) -> u64 {
        offered.saturating_sub(self.returned)
    }
}

/// Result of unwinding a strategy position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Divestment {
    /// Base asset returned to the vault
    pub assets: u64,
    /// Base asset taken out of the position
    pub base_amount: u64,
    /// Counter asset taken out of the position (swapped back to base)
    pub counter_amount: u64,
}

/// Mutable handles on the venues a vault deploys into
pub struct Venues<'a> {
    pub lending: &'a mut LendingMarket,
    pub pool: &'a mut LiquidityPool,
}

impl<'a> Venues<'a> {
    pub fn new(lending: &'a mut LendingMarket, pool: &'a mut LiquidityPool) -> Self {
        Self { lending, pool }
    }

    /// Adapter for `kind`, oriented on the vault's base and counter assets
    pub fn adapter(
        &mut self,
        kind: StrategyKind,
        base_mint: Pubkey,
        counter_mint: Pubkey,
        max_slippage_bps: u16,
    ) -> Result<Strategy<'_>> {
        Ok(match kind {
            StrategyKind::Lending => Strategy::Lending(LendingAdapter::new(self.lending, base_mint)?),
            StrategyKind::LiquidityPool => Strategy::LiquidityPool(PoolAdapter::new(
                self.pool,
                base_mint,
                counter_mint,
                max_slippage_bps,
            )?),
        })
    }
}

pub enum Strategy<'a> {
    Lending(LendingAdapter<'a>),
    LiquidityPool(PoolAdapter<'a>),
}

impl Strategy<'_> {
    pub fn invest(&mut self, amount: u64) -> Result<Investment> {
        match self {
            Strategy::Lending(adapter) => adapter.invest(amount),
            Strategy::LiquidityPool(adapter) => adapter.invest(amount),
        }
    }

    pub fn divest(&mut self, position: u64) -> Result<Divestment> {
        match self {
            Strategy::Lending(adapter) => adapter.divest(position),
            Strategy::LiquidityPool(adapter) => adapter.divest(position),
        }
    }

    pub fn valuate(&self, position: u64) -> Result<u64> {
        match self {
            Strategy::Lending(adapter) => adapter.valuate(position),
            Strategy::LiquidityPool(adapter) => adapter.valuate(position),
        }
    }

    /// Most the venue will take on top of `position` in one investment
    pub fn capacity(&self, position: u64) -> Result<u64> {
        match self {
            Strategy::Lending(_) => Ok(u64::MAX),
            Strategy::LiquidityPool(adapter) => adapter.capacity(position),
        }
    }
}
