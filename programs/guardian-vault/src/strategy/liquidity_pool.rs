use anchor_lang::prelude::*;

use super::{Divestment, Investment};
use crate::{
    constants::BPS_DENOMINATOR,
    errors::VaultError,
    math::{isqrt, min_out, mul_div, Rounding},
    state::LiquidityPool,
};

/// Counterparty for `base` in the pair containing it
///
/// Vaults over `primary` pair against `secondary`; every other asset pairs
/// against `primary`.
pub fn counter_asset(base: &Pubkey, primary: &Pubkey, secondary: &Pubkey) -> Pubkey {
    if base == primary {
        *secondary
    } else {
        *primary
    }
}

/// Output of a constant-product swap after the pool fee
pub fn swap_output(amount_in: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    let in_with_fee = (amount_in as u128)
        .checked_mul((BPS_DENOMINATOR - fee_bps as u64) as u128)
        .ok_or(VaultError::MathOverflow)?;
    let denominator = (reserve_in as u128)
        .checked_mul(BPS_DENOMINATOR as u128)
        .and_then(|r| r.checked_add(in_with_fee))
        .ok_or(VaultError::MathOverflow)?;
    mul_div(in_with_fee, reserve_out as u128, denominator, Rounding::Down)
}

/// Amount of `amount` to swap so the remainder and the swap output match
/// the post-swap reserve ratio
///
/// s = (sqrt(R^2 (2 - f)^2 + 4 (1 - f) a R) - R (2 - f)) / (2 (1 - f))
pub fn optimal_swap_amount(amount: u64, reserve_in: u64, fee_bps: u16) -> Result<u64> {
    let denominator = BPS_DENOMINATOR as u128;
    let keep = denominator - fee_bps as u128;
    let reserve = reserve_in as u128;

    let linear = reserve
        .checked_mul(denominator + keep)
        .ok_or(VaultError::MathOverflow)?;
    let radicand = linear.checked_mul(linear).and_then(|sq| {
        (amount as u128)
            .checked_mul(reserve)?
            .checked_mul(4 * keep * denominator)
            .and_then(|cross| sq.checked_add(cross))
    });

    let swap = match radicand {
        Some(radicand) => (isqrt(radicand) - linear) / (2 * keep),
        // Very deep pools: the fee-free split sqrt(R (R + a)) - R swaps
        // slightly less, and the unpaired base returns to idle
        None => {
            let product = reserve
                .checked_mul(reserve + amount as u128)
                .ok_or(VaultError::MathOverflow)?;
            isqrt(product) - reserve
        }
    };
    Ok(u64::try_from(swap).map_err(|_| VaultError::MathOverflow)?.min(amount))
}

/// Zaps the base asset into a two-sided liquidity position
///
/// Reserves and LP amounts are read through the vault's orientation
/// (`base`, `counter`) whichever side of the canonical pair the base asset
/// sits on.
pub struct PoolAdapter<'a> {
    pool: &'a mut LiquidityPool,
    base_is_a: bool,
    max_slippage_bps: u16,
}

impl<'a> PoolAdapter<'a> {
    pub fn new(
        pool: &'a mut LiquidityPool,
        base_mint: Pubkey,
        counter_mint: Pubkey,
        max_slippage_bps: u16,
    ) -> Result<Self> {
        require!(
            base_mint != counter_mint && pool.contains(&base_mint) && pool.contains(&counter_mint),
            VaultError::InvalidPoolPair
        );
        let base_is_a = pool.mint_a == base_mint;
        Ok(Self {
            pool,
            base_is_a,
            max_slippage_bps,
        })
    }

    /// (base reserve, counter reserve)
    pub fn reserves(&self) -> (u64, u64) {
        if self.base_is_a {
            (self.pool.reserve_a, self.pool.reserve_b)
        } else {
            (self.pool.reserve_b, self.pool.reserve_a)
        }
    }

    fn set_reserves(&mut self, base: u64, counter: u64) {
        if self.base_is_a {
            self.pool.reserve_a = base;
            self.pool.reserve_b = counter;
        } else {
            self.pool.reserve_b = base;
            self.pool.reserve_a = counter;
        }
    }

    /// Quote without touching reserves
    fn quote(&self, amount_in: u64, base_to_counter: bool) -> Result<u64> {
        let (base, counter) = self.reserves();
        let (reserve_in, reserve_out) = if base_to_counter {
            (base, counter)
        } else {
            (counter, base)
        };
        require!(
            reserve_in > 0 && reserve_out > 0,
            VaultError::InsufficientLiquidity
        );
        swap_output(amount_in, reserve_in, reserve_out, self.pool.fee_bps)
    }

    /// Swap against the pool with a minimum-output bound at the
    /// pre-trade spot price
    fn swap(&mut self, amount_in: u64, base_to_counter: bool) -> Result<u64> {
        let (base, counter) = self.reserves();
        let (reserve_in, reserve_out) = if base_to_counter {
            (base, counter)
        } else {
            (counter, base)
        };

        let out = self.quote(amount_in, base_to_counter)?;
        let spot = mul_div(
            amount_in as u128,
            reserve_out as u128,
            reserve_in as u128,
            Rounding::Down,
        )?;
        let floor = min_out(spot, self.max_slippage_bps)?;
        if out < floor {
            msg!("Swap of {} returned {}, minimum {}", amount_in, out, floor);
            return err!(VaultError::SlippageExceeded);
        }
        require_gt!(reserve_out, out, VaultError::InsufficientLiquidity);

        let reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or(VaultError::MathOverflow)?;
        let reserve_out = reserve_out - out;
        if base_to_counter {
            self.set_reserves(reserve_in, reserve_out);
        } else {
            self.set_reserves(reserve_out, reserve_in);
        }

        Ok(out)
    }

    /// Largest zap whose swap leg stays within half the slippage bound
    ///
    /// The other half is left for the liquidity add and for unwinding the
    /// resulting position under the same bound.
    pub fn max_zap_amount(&self, base_reserve: u64) -> Result<u64> {
        let denominator = BPS_DENOMINATOR as u128;
        let keep = denominator - self.pool.fee_bps as u128;
        let floor = denominator - self.max_slippage_bps as u128;
        if base_reserve == 0 || keep <= floor {
            return Ok(0);
        }
        if floor == 0 {
            return Ok(u64::MAX);
        }
        let reserve = base_reserve as u128;

        // out / spot = keep R / (D R + keep s) >= floor / D
        let swap_cap = mul_div(
            reserve,
            denominator * (keep - floor),
            2 * floor * keep,
            Rounding::Down,
        )?;
        // Inverse of the optimal split: a = s (D + keep) / D + keep s^2 / (D R)
        let linear = mul_div(
            swap_cap as u128,
            denominator + keep,
            denominator,
            Rounding::Down,
        )?;
        let square = mul_div(swap_cap as u128, swap_cap as u128, reserve, Rounding::Down)?;
        let quadratic = mul_div(square as u128, keep, denominator, Rounding::Down)?;
        Ok(linear.saturating_add(quadratic))
    }

    /// Zap size the pool accepts on top of an existing `lp` position
    pub fn capacity(&self, lp: u64) -> Result<u64> {
        let (base, _) = self.reserves();
        let own = if self.pool.lp_supply == 0 {
            0
        } else {
            mul_div(lp as u128, base as u128, self.pool.lp_supply as u128, Rounding::Down)?
        };
        self.max_zap_amount(base.saturating_sub(own))
    }

    /// Anything beyond `max_zap_amount` is returned unspent
    pub fn invest(&mut self, offered: u64) -> Result<Investment> {
        if offered == 0 {
            return Ok(Investment::default());
        }

        let (base, counter) = self.reserves();
        require!(
            base > 0 && counter > 0 && self.pool.lp_supply > 0,
            VaultError::InsufficientLiquidity
        );

        let amount = offered.min(self.max_zap_amount(base)?);
        let held_back = offered - amount;
        if held_back > 0 {
            msg!("Pool zap capped at {} of {}", amount, offered);
        }
        if amount == 0 {
            return Ok(Investment {
                returned: offered,
                ..Investment::default()
            });
        }

        let swap_in = optimal_swap_amount(amount, base, self.pool.fee_bps)?;
        let expected_lp = mul_div(
            (amount - swap_in) as u128,
            self.pool.lp_supply as u128,
            base as u128,
            Rounding::Down,
        )?;
        // Not worth a single LP unit: keep it idle
        if swap_in == 0 || expected_lp == 0 || self.quote(swap_in, true)? == 0 {
            return Ok(Investment {
                returned: offered,
                ..Investment::default()
            });
        }

        let counter_in = self.swap(swap_in, true)?;

        // Only what is left after the swap is supplied
        let leftover = amount - swap_in;
        let (base, counter) = self.reserves();
        let lp_supply = self.pool.lp_supply;

        let counter_optimal = mul_div(leftover as u128, counter as u128, base as u128, Rounding::Down)?;
        let (base_used, counter_used) = if counter_optimal <= counter_in {
            (leftover, counter_optimal)
        } else {
            let base_optimal =
                mul_div(counter_in as u128, base as u128, counter as u128, Rounding::Down)?;
            (base_optimal, counter_in)
        };

        let lp = mul_div(base_used as u128, lp_supply as u128, base as u128, Rounding::Down)?.min(
            mul_div(counter_used as u128, lp_supply as u128, counter as u128, Rounding::Down)?,
        );
        let lp_floor = min_out(expected_lp, self.max_slippage_bps)?;
        if lp < lp_floor {
            msg!("Liquidity add minted {} LP, minimum {}", lp, lp_floor);
            return err!(VaultError::SlippageExceeded);
        }
        require!(lp > 0, VaultError::InsufficientLiquidity);

        self.set_reserves(
            base.checked_add(base_used).ok_or(VaultError::MathOverflow)?,
            counter.checked_add(counter_used).ok_or(VaultError::MathOverflow)?,
        );
        self.pool.lp_supply = lp_supply.checked_add(lp).ok_or(VaultError::MathOverflow)?;

        // Unpaired counter dust goes back to the base asset
        let counter_dust = counter_in - counter_used;
        let swapped_back = if counter_dust > 0 {
            self.swap(counter_dust, false)?
        } else {
            0
        };

        Ok(Investment {
            position_delta: lp,
            base_amount: base_used,
            counter_amount: counter_used,
            swapped_amount: swap_in,
            returned: (leftover - base_used) + swapped_back + held_back,
        })
    }

    pub fn divest(&mut self, lp: u64) -> Result<Divestment> {
        if lp == 0 {
            return Ok(Divestment::default());
        }
        let lp_supply = self.pool.lp_supply;
        require_gte!(lp_supply, lp, VaultError::InsufficientLiquidity);

        let expected = self.valuate(lp)?;
        let (base, counter) = self.reserves();
        let base_out = mul_div(lp as u128, base as u128, lp_supply as u128, Rounding::Down)?;
        let counter_out = mul_div(lp as u128, counter as u128, lp_supply as u128, Rounding::Down)?;

        self.set_reserves(base - base_out, counter - counter_out);
        self.pool.lp_supply = lp_supply - lp;

        let swapped_back = if counter_out > 0 {
            self.swap(counter_out, false)?
        } else {
            0
        };
        let assets = base_out
            .checked_add(swapped_back)
            .ok_or(VaultError::MathOverflow)?;

        let floor = min_out(expected, self.max_slippage_bps)?;
        if assets < floor {
            msg!("Liquidity removal returned {}, minimum {}", assets, floor);
            return err!(VaultError::SlippageExceeded);
        }

        Ok(Divestment {
            assets,
            base_amount: base_out,
            counter_amount: counter_out,
        })
    }

    /// Pro-rata share of both reserves, counter side priced at spot
    pub fn valuate(&self, lp: u64) -> Result<u64> {
        let lp_supply = self.pool.lp_supply;
        if lp_supply == 0 || lp == 0 {
            return Ok(0);
        }
        let (base, counter) = self.reserves();
        let base_part = mul_div(lp as u128, base as u128, lp_supply as u128, Rounding::Down)?;
        let counter_part = mul_div(lp as u128, counter as u128, lp_supply as u128, Rounding::Down)?;
        let counter_value = if counter == 0 {
            0
        } else {
            mul_div(counter_part as u128, base as u128, counter as u128, Rounding::Down)?
        };
        base_part
            .checked_add(counter_value)
            .ok_or(error!(VaultError::MathOverflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(mint_a: Pubkey, mint_b: Pubkey, reserve_a: u64, reserve_b: u64, fee_bps: u16) -> LiquidityPool {
        LiquidityPool {
            authority: Pubkey::default(),
            mint_a,
            mint_b,
            custody_a: Pubkey::new_unique(),
            custody_b: Pubkey::new_unique(),
            reserve_a,
            reserve_b,
            lp_supply: isqrt(reserve_a as u128 * reserve_b as u128) as u64,
            fee_bps,
            bump: 0,
            custody_a_bump: 0,
            custody_b_bump: 0,
        }
    }

    fn pair() -> (Pubkey, Pubkey) {
        LiquidityPool::canonical_pair(Pubkey::new_unique(), Pubkey::new_unique())
    }

    #[test]
    fn test_counter_asset_selection() {
        let primary = Pubkey::new_unique();
        let secondary = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        assert_eq!(counter_asset(&primary, &primary, &secondary), secondary);
        assert_eq!(counter_asset(&secondary, &primary, &secondary), primary);
        assert_eq!(counter_asset(&other, &primary, &secondary), primary);
    }

    #[test]
    fn test_swap_output_constant_product() {
        // No fee: 100 * 1000 / (1000 + 100) = 90.9
        assert_eq!(swap_output(100, 1_000, 1_000, 0).unwrap(), 90);
        // 0.3% fee lowers the output
        assert!(swap_output(100, 1_000, 1_000, 30).unwrap() <= 90);
    }

    #[test]
    fn test_optimal_swap_without_fee() {
        // sqrt(R (R + a)) - R with R = 1_000_000, a = 21_000 -> 10_445
        let s = optimal_swap_amount(21_000, 1_000_000, 0).unwrap();
        assert_eq!(s, 10_445);
        assert!(optimal_swap_amount(1, 1_000_000, 30).unwrap() <= 1);
    }

    #[test]
    fn test_invest_supplies_only_post_swap_leftover() {
        let (a, b) = pair();
        let mut p = pool(a, b, 100_000_000, 100_000_000, 30);
        let base_before = p.reserve_a;
        let mut adapter = PoolAdapter::new(&mut p, a, b, 100).unwrap();

        let inv = adapter.invest(100_000).unwrap();
        assert!(inv.position_delta > 0);
        assert!(inv.base_amount + inv.swapped_amount <= 100_000);
        assert!(inv.base_amount <= 100_000 - inv.swapped_amount);

        // Pool gained exactly what left the vault
        let consumed = inv.consumed(100_000);
        assert_eq!(p.reserve_a - base_before, consumed);
    }

    #[test]
    fn test_orientation_independent_of_canonical_order() {
        let (a, b) = pair();
        let mut p1 = pool(a, b, 50_000_000, 200_000_000, 30);
        let mut p2 = pool(a, b, 200_000_000, 50_000_000, 30);

        // Base on side a in p1, on side b in p2 with mirrored reserves
        let inv1 = PoolAdapter::new(&mut p1, a, b, 100).unwrap().invest(40_000).unwrap();
        let inv2 = PoolAdapter::new(&mut p2, b, a, 100).unwrap().invest(40_000).unwrap();

        assert_eq!(inv1, inv2);
        assert_eq!(p1.reserve_a, p2.reserve_b);
        assert_eq!(p1.reserve_b, p2.reserve_a);
    }

    #[test]
    fn test_divest_never_exceeds_valuation() {
        let (a, b) = pair();
        let mut p = pool(a, b, 80_000_000, 120_000_000, 30);
        let mut adapter = PoolAdapter::new(&mut p, b, a, 100).unwrap();

        let inv = adapter.invest(250_000).unwrap();
        let valuation = adapter.valuate(inv.position_delta).unwrap();
        let out = adapter.divest(inv.position_delta).unwrap();

        assert!(out.assets <= valuation);
        assert!(out.assets > 0);
    }

    #[test]
    fn test_large_trade_is_capped_to_slippage_bound() {
        let (a, b) = pair();
        // 20% of the pool, far beyond what a 1% bound admits at 30 bps
        let mut p = pool(a, b, 1_000_000, 1_000_000, 30);
        let lp_before = p.lp_supply;
        let mut adapter = PoolAdapter::new(&mut p, a, b, 100).unwrap();
        let cap = adapter.max_zap_amount(1_000_000).unwrap();
        assert!(cap > 0 && cap < 10_000, "cap {}", cap);

        let result = adapter.invest(200_000).unwrap();
        assert!(result.position_delta > 0);
        assert!(result.consumed(200_000) <= cap);
        assert!(result.returned >= 200_000 - cap);
        drop(adapter);
        assert_eq!(p.lp_supply, lp_before + result.position_delta);
    }

    #[test]
    fn test_bound_below_pool_fee_keeps_everything_idle() {
        let (a, b) = pair();
        let mut p = pool(a, b, 1_000_000_000, 1_000_000_000, 30);
        let before = (p.reserve_a, p.reserve_b, p.lp_supply);
        let mut adapter = PoolAdapter::new(&mut p, a, b, 20).unwrap();
        assert_eq!(adapter.max_zap_amount(1_000_000_000).unwrap(), 0);

        let result = adapter.invest(5_000_000).unwrap();
        assert_eq!(result.returned, 5_000_000);
        assert_eq!(result.position_delta, 0);
        drop(adapter);
        assert_eq!((p.reserve_a, p.reserve_b, p.lp_supply), before);
    }

    #[test]
    fn test_capacity_excludes_own_position() {
        let (a, b) = pair();
        let mut p = pool(a, b, 1_000_000_000, 1_000_000_000, 30);
        let mut adapter = PoolAdapter::new(&mut p, a, b, 100).unwrap();
        let empty = adapter.capacity(0).unwrap();
        let lp = adapter.invest(empty).unwrap().position_delta;
        assert!(lp > 0);
        // The position's own base share does not count as depth
        let with_position = adapter.capacity(lp).unwrap();
        assert!(with_position.abs_diff(empty) <= empty / 100, "{} vs {}", with_position, empty);
    }

    #[test]
    fn test_dust_investment_stays_idle() {
        let (a, b) = pair();
        let mut p = pool(a, b, 1_000_000_000, 1_000_000_000, 30);
        let mut adapter = PoolAdapter::new(&mut p, a, b, 100).unwrap();
        let inv = adapter.invest(1).unwrap();
        assert_eq!(inv.returned, 1);
        assert_eq!(inv.position_delta, 0);
    }

    #[test]
    fn test_pool_without_base_rejected() {
        let (a, b) = pair();
        let mut p = pool(a, b, 1_000, 1_000, 30);
        assert!(PoolAdapter::new(&mut p, Pubkey::new_unique(), b, 100).is_err());
    }
}
