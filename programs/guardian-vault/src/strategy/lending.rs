use anchor_lang::prelude::*;

use super::{Divestment, Investment};
use crate::{
    errors::VaultError,
    math::{mul_div, Rounding},
    state::LendingMarket,
};

/// Deposits into a lending market against interest-bearing receipts
pub struct LendingAdapter<'a> {
    market: &'a mut LendingMarket,
}

impl<'a> LendingAdapter<'a> {
    pub fn new(market: &'a mut LendingMarket, asset_mint: Pubkey) -> Result<Self> {
        require_keys_eq!(market.asset_mint, asset_mint, VaultError::InvalidVenue);
        Ok(Self { market })
    }

    pub fn invest(&mut self, amount: u64) -> Result<Investment> {
        if amount == 0 {
            return Ok(Investment::default());
        }

        let receipts = if self.market.receipt_supply == 0 {
            amount
        } else {
            require!(
                self.market.total_liquidity > 0,
                VaultError::InsufficientLiquidity
            );
            mul_div(
                amount as u128,
                self.market.receipt_supply as u128,
                self.market.total_liquidity as u128,
                Rounding::Down,
            )?
        };

        // Too small to earn a single receipt: keep it idle
        if receipts == 0 {
            return Ok(Investment {
                returned: amount,
                ..Investment::default()
            });
        }

        self.market.total_liquidity = self
            .market
            .total_liquidity
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.market.receipt_supply = self
            .market
            .receipt_supply
            .checked_add(receipts)
            .ok_or(VaultError::MathOverflow)?;

        Ok(Investment {
            position_delta: receipts,
            base_amount: amount,
            ..Investment::default()
        })
    }

    pub fn divest(&mut self, receipts: u64) -> Result<Divestment> {
        if receipts == 0 {
            return Ok(Divestment::default());
        }
        require_gte!(
            self.market.receipt_supply,
            receipts,
            VaultError::InsufficientLiquidity
        );

        let amount = self.valuate(receipts)?;
        require_gte!(
            self.market.total_liquidity,
            amount,
            VaultError::InsufficientLiquidity
        );

        self.market.total_liquidity -= amount;
        self.market.receipt_supply -= receipts;

        Ok(Divestment {
            assets: amount,
            base_amount: amount,
            counter_amount: 0,
        })
    }

    /// Current worth of `receipts` at the market exchange rate
    pub fn valuate(&self, receipts: u64) -> Result<u64> {
        if self.market.receipt_supply == 0 {
            return Ok(0);
        }
        mul_div(
            receipts as u128,
            self.market.total_liquidity as u128,
            self.market.receipt_supply as u128,
            Rounding::Down,
        )
    }
}
