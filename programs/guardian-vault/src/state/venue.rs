use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Interest-bearing lending market for one asset
///
/// Depositors receive receipts; `total_liquidity` grows as interest
/// accrues, so each receipt redeems for more of the asset over time.
/// `total_liquidity` always equals the custody token balance.
#[account]
#[derive(Default, InitSpace)]
pub struct LendingMarket {
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub custody: Pubkey,
    pub total_liquidity: u64,
    pub receipt_supply: u64,
    pub bump: u8,
    pub custody_bump: u8,
}

impl LendingMarket {
    pub fn accrue_interest(&mut self, amount: u64) -> Result<()> {
        self.total_liquidity = self
            .total_liquidity
            .checked_add(amount)
            .ok_or(error!(VaultError::MathOverflow))?;
        Ok(())
    }
}

/// Constant-product pool over a canonical mint pair (`mint_a < mint_b`)
///
/// Reserves always equal the corresponding custody token balances.
#[account]
#[derive(Default, InitSpace)]
pub struct LiquidityPool {
    pub authority: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub custody_a: Pubkey,
    pub custody_b: Pubkey,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub lp_supply: u64,
    pub fee_bps: u16,
    pub bump: u8,
    pub custody_a_bump: u8,
    pub custody_b_bump: u8,
}

impl LiquidityPool {
    /// Canonical ordering for a pair of mints
    pub fn canonical_pair(x: Pubkey, y: Pubkey) -> (Pubkey, Pubkey) {
        if x.to_bytes() <= y.to_bytes() {
            (x, y)
        } else {
            (y, x)
        }
    }

    pub fn contains(&self, mint: &Pubkey) -> bool {
        self.mint_a == *mint || self.mint_b == *mint
    }

    /// Custody account holding `mint`
    pub fn custody_for(&self, mint: &Pubkey) -> Result<Pubkey> {
        if *mint == self.mint_a {
            Ok(self.custody_a)
        } else if *mint == self.mint_b {
            Ok(self.custody_b)
        } else {
            err!(VaultError::InvalidPoolPair)
        }
    }

    /// Reserve of `mint`
    pub fn reserve_of(&self, mint: &Pubkey) -> Result<u64> {
        if *mint == self.mint_a {
            Ok(self.reserve_a)
        } else if *mint == self.mint_b {
            Ok(self.reserve_b)
        } else {
            err!(VaultError::InvalidPoolPair)
        }
    }
}
